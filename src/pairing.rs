//! Stereo pair discovery within one directory
//!
//! Split impulse responses are named `"<base> L.wav"` and `"<base> R.wav"`.
//! Matching is exact and case-sensitive.

use std::collections::HashSet;

pub const LEFT_SUFFIX: &str = " L.wav";
pub const RIGHT_SUFFIX: &str = " R.wav";

/// Which half of a pair a file name claims to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Split a file name into its pair base name and side.
///
/// Returns `None` for names that do not end in `" L.wav"` or `" R.wav"`.
pub fn split_name(name: &str) -> Option<(&str, Side)> {
    if let Some(base) = name.strip_suffix(LEFT_SUFFIX) {
        Some((base, Side::Left))
    } else {
        name.strip_suffix(RIGHT_SUFFIX)
            .map(|base| (base, Side::Right))
    }
}

/// File name of the left half of `base_name`
pub fn left_name(base_name: &str) -> String {
    format!("{}{}", base_name, LEFT_SUFFIX)
}

/// File name of the right half of `base_name`
pub fn right_name(base_name: &str) -> String {
    format!("{}{}", base_name, RIGHT_SUFFIX)
}

/// File name of the quad file combining `base_name`
pub fn quad_name(base_name: &str) -> String {
    format!("{}.wav", base_name)
}

/// Two split files present in the same directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoPair {
    pub base_name: String,
    pub left: String,
    pub right: String,
}

/// What to do with one file during mux
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    /// Not a split file name; copy unchanged
    PassThrough,
    /// First sighting of a complete pair; combine it
    Pair(StereoPair),
    /// The pair this file belongs to was already handled
    AlreadyProcessed,
    /// Split name whose counterpart is missing; copy unchanged
    Unpaired { base_name: String, side: Side },
}

/// Classifies the files of one directory, handing out each pair once.
///
/// The processed set lives and dies with the matcher, so nothing leaks
/// between directories.
#[derive(Debug)]
pub struct PairMatcher<'a> {
    files: &'a HashSet<String>,
    processed: HashSet<String>,
}

impl<'a> PairMatcher<'a> {
    /// Create a matcher over the file names of one directory
    pub fn new(files: &'a HashSet<String>) -> Self {
        PairMatcher {
            files,
            processed: HashSet::new(),
        }
    }

    /// Look up the complete pair for `base_name`, if both halves exist
    pub fn find_pair(&self, base_name: &str) -> Option<StereoPair> {
        let left = left_name(base_name);
        let right = right_name(base_name);
        if self.files.contains(&left) && self.files.contains(&right) {
            Some(StereoPair {
                base_name: base_name.to_string(),
                left,
                right,
            })
        } else {
            None
        }
    }

    /// Decide how to handle `name`.
    ///
    /// A complete pair is returned once and its base name is marked
    /// processed, so the counterpart file later yields `AlreadyProcessed`.
    pub fn classify(&mut self, name: &str) -> DirectoryEntry {
        let Some((base_name, side)) = split_name(name) else {
            return DirectoryEntry::PassThrough;
        };
        if self.processed.contains(base_name) {
            return DirectoryEntry::AlreadyProcessed;
        }
        match self.find_pair(base_name) {
            Some(pair) => {
                self.processed.insert(pair.base_name.clone());
                DirectoryEntry::Pair(pair)
            }
            None => DirectoryEntry::Unpaired {
                base_name: base_name.to_string(),
                side,
            },
        }
    }

    /// Base names handed out so far
    #[cfg(test)]
    fn processed(&self) -> &HashSet<String> {
        &self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("IR1 L.wav"), Some(("IR1", Side::Left)));
        assert_eq!(split_name("Big Hall R.wav"), Some(("Big Hall", Side::Right)));
        assert_eq!(split_name(" L.wav"), Some(("", Side::Left)));
        assert_eq!(split_name("IR1.wav"), None);
        assert_eq!(split_name("IR1 l.wav"), None);
        assert_eq!(split_name("IR1 L.WAV"), None);
        assert_eq!(split_name("IR1_L.wav"), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(left_name("IR1"), "IR1 L.wav");
        assert_eq!(right_name("IR1"), "IR1 R.wav");
        assert_eq!(quad_name("IR1"), "IR1.wav");
    }

    #[test]
    fn test_pair_handed_out_once() {
        let dir = files(&["x L.wav", "x R.wav", "notes.txt"]);
        let mut matcher = PairMatcher::new(&dir);

        let pair = StereoPair {
            base_name: "x".to_string(),
            left: "x L.wav".to_string(),
            right: "x R.wav".to_string(),
        };
        assert_eq!(matcher.classify("x R.wav"), DirectoryEntry::Pair(pair));
        assert_eq!(matcher.classify("x L.wav"), DirectoryEntry::AlreadyProcessed);
        assert_eq!(matcher.classify("notes.txt"), DirectoryEntry::PassThrough);
        assert!(matcher.processed().contains("x"));
    }

    #[test]
    fn test_lone_half_is_unpaired() {
        let dir = files(&["solo L.wav", "other R.wav"]);
        let mut matcher = PairMatcher::new(&dir);

        assert_eq!(
            matcher.classify("solo L.wav"),
            DirectoryEntry::Unpaired {
                base_name: "solo".to_string(),
                side: Side::Left,
            }
        );
        assert_eq!(
            matcher.classify("other R.wav"),
            DirectoryEntry::Unpaired {
                base_name: "other".to_string(),
                side: Side::Right,
            }
        );
        assert!(matcher.processed().is_empty());
    }

    #[test]
    fn test_case_sensitive_counterpart() {
        let dir = files(&["a L.wav", "a r.wav"]);
        let matcher = PairMatcher::new(&dir);
        assert_eq!(matcher.find_pair("a"), None);
    }
}
