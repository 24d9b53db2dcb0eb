//! CLI Module
//!
//! Command-line arguments for irquad.

use std::path::PathBuf;

use clap::Parser;

use crate::walker::{ConvertOptions, FailurePolicy, Mode};

/// Convert true stereo impulse responses between split L/R and quad WAV files
#[derive(Parser, Debug)]
#[command(name = "irquad")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input directory
    #[arg(long)]
    pub indir: PathBuf,

    /// Output directory (mirrors the input layout)
    #[arg(long)]
    pub outdir: PathBuf,

    /// Split (demux) quad-channel files instead of merging
    #[arg(long)]
    pub demux: bool,

    /// Log per-file failures and continue instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Write a JSON summary of the run to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Conversion options selected by the flags
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            mode: if self.demux { Mode::Demux } else { Mode::Mux },
            on_error: if self.keep_going {
                FailurePolicy::KeepGoing
            } else {
                FailurePolicy::FailFast
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_fail_fast_mux() {
        let cli = Cli::try_parse_from(["irquad", "--indir", "in", "--outdir", "out"]).unwrap();
        let options = cli.options();
        assert_eq!(options.mode, Mode::Mux);
        assert_eq!(options.on_error, FailurePolicy::FailFast);
        assert_eq!(cli.report, None);
    }

    #[test]
    fn test_demux_keep_going() {
        let cli = Cli::try_parse_from([
            "irquad",
            "--indir",
            "in",
            "--outdir",
            "out",
            "--demux",
            "--keep-going",
            "--report",
            "run.json",
        ])
        .unwrap();
        let options = cli.options();
        assert_eq!(options.mode, Mode::Demux);
        assert_eq!(options.on_error, FailurePolicy::KeepGoing);
        assert_eq!(cli.report, Some(PathBuf::from("run.json")));
    }

    #[test]
    fn test_requires_both_directories() {
        assert!(Cli::try_parse_from(["irquad", "--indir", "in"]).is_err());
        assert!(Cli::try_parse_from(["irquad", "--outdir", "out"]).is_err());
    }
}
