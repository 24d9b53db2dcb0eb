//! Directory tree conversion
//!
//! Mirrors an input tree into an output tree one directory at a time.
//! In mux mode each directory's split pairs become quad files; in demux
//! mode each quad file becomes a split pair. Everything else is copied
//! byte for byte under its original name.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::error::{IrError, Result};
use crate::interleave::{self, QUAD_CHANNELS};
use crate::pairing::{self, DirectoryEntry, PairMatcher, StereoPair};
use crate::wav;

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Combine `"<base> L.wav"` + `"<base> R.wav"` into `"<base>.wav"`
    #[default]
    Mux,
    /// Split 4-channel `"<base>.wav"` into `"<base> L.wav"` + `"<base> R.wav"`
    Demux,
}

/// What to do when a file cannot be read or written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure
    #[default]
    FailFast,
    /// Log the failure, record it in the report and move on
    KeepGoing,
}

/// Options for a tree conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub mode: Mode,
    pub on_error: FailurePolicy,
}

impl ConvertOptions {
    pub fn new(mode: Mode) -> Self {
        ConvertOptions {
            mode,
            ..Default::default()
        }
    }

    /// Continue past per-file failures instead of aborting
    pub fn keep_going(mut self) -> Self {
        self.on_error = FailurePolicy::KeepGoing;
        self
    }
}

/// Summary of one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub mode: Mode,
    /// Directories visited
    pub directories: usize,
    /// Quad files produced by mux
    pub quads_written: usize,
    /// Split pairs produced by demux
    pub pairs_written: usize,
    /// Files copied unchanged
    pub files_copied: usize,
    /// Split files copied because their counterpart was missing
    pub unpaired_files: usize,
    /// Base names skipped because their halves did not match
    pub skipped_pairs: Vec<String>,
    /// Files that failed in keep-going mode
    pub failed: Vec<PathBuf>,
}

impl ConversionReport {
    fn new(mode: Mode) -> Self {
        ConversionReport {
            mode,
            ..Default::default()
        }
    }

    /// Whether every file was converted or copied
    pub fn is_clean(&self) -> bool {
        self.skipped_pairs.is_empty() && self.failed.is_empty()
    }
}

/// Combine split pairs under `indir` into quad files under `outdir`
pub fn mux_files(indir: &Path, outdir: &Path) -> Result<ConversionReport> {
    convert(indir, outdir, ConvertOptions::new(Mode::Mux))
}

/// Split quad files under `indir` into pairs under `outdir`
pub fn demux_files(indir: &Path, outdir: &Path) -> Result<ConversionReport> {
    convert(indir, outdir, ConvertOptions::new(Mode::Demux))
}

/// Convert the tree under `indir` into `outdir`, mirroring its layout.
///
/// Output directories are created as needed. A mismatched pair is logged
/// and skipped. Any other failure aborts the run unless `options` asks to
/// keep going.
///
/// # Errors
/// * `Io` - If a directory cannot be created or listed, or (fail-fast) a
///   file cannot be read, written or copied
/// * `Format` - (fail-fast) If a WAV file is corrupt or unsupported
/// * `Walk` - If the input tree cannot be traversed
pub fn convert(indir: &Path, outdir: &Path, options: ConvertOptions) -> Result<ConversionReport> {
    let meta = fs::metadata(indir).map_err(|e| IrError::io(indir, e))?;
    if !meta.is_dir() {
        return Err(IrError::io(
            indir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }
    fs::create_dir_all(outdir).map_err(|e| IrError::io(outdir, e))?;

    let nested_output = nested_output(indir, outdir)?;
    let mut report = ConversionReport::new(options.mode);

    let walker = WalkDir::new(indir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_output_root(entry, nested_output.as_deref()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(indir) else {
            continue;
        };
        let out_dir = outdir.join(rel);
        fs::create_dir_all(&out_dir).map_err(|e| IrError::io(&out_dir, e))?;

        process_directory(entry.path(), &out_dir, options, &mut report)?;
    }

    Ok(report)
}

// ============================================================================
// Per-directory processing
// ============================================================================

fn process_directory(
    src: &Path,
    dst: &Path,
    options: ConvertOptions,
    report: &mut ConversionReport,
) -> Result<()> {
    let names = list_files(src)?;
    debug!("{}: {} files", src.display(), names.len());
    report.directories += 1;

    match options.mode {
        Mode::Mux => mux_directory(src, dst, &names, options, report),
        Mode::Demux => demux_directory(src, dst, &names, options, report),
    }
}

fn mux_directory(
    src: &Path,
    dst: &Path,
    names: &[OsString],
    options: ConvertOptions,
    report: &mut ConversionReport,
) -> Result<()> {
    let utf8_names: HashSet<String> = names
        .iter()
        .filter_map(|name| name.to_str().map(str::to_owned))
        .collect();
    let mut matcher = PairMatcher::new(&utf8_names);

    for name in names {
        let src_path = src.join(name);
        let entry = match name.to_str() {
            Some(name) => matcher.classify(name),
            None => DirectoryEntry::PassThrough,
        };

        let outcome = match entry {
            DirectoryEntry::PassThrough => copy_file(&src_path, &dst.join(name), report),
            DirectoryEntry::AlreadyProcessed => Ok(()),
            DirectoryEntry::Unpaired { base_name, side } => {
                warn!(
                    "No counterpart for {:?} half of '{}' in {}, copying as-is",
                    side,
                    base_name,
                    src.display()
                );
                report.unpaired_files += 1;
                copy_file(&src_path, &dst.join(name), report)
            }
            DirectoryEntry::Pair(pair) => mux_pair(src, dst, &pair, report),
        };
        settle(outcome, &src_path, options, report)?;
    }
    Ok(())
}

fn mux_pair(
    src: &Path,
    dst: &Path,
    pair: &StereoPair,
    report: &mut ConversionReport,
) -> Result<()> {
    let left = wav::read(&src.join(&pair.left))?;
    let right = wav::read(&src.join(&pair.right))?;

    let quad = match interleave::mux(&pair.base_name, &left, &right) {
        Ok(quad) => quad,
        Err(IrError::ParameterMismatch { base_name, details }) => {
            warn!("Skipping {} due to mismatched parameters: {}", base_name, details);
            report.skipped_pairs.push(base_name);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let out_path = dst.join(pairing::quad_name(&pair.base_name));
    wav::write(&out_path, &quad.params, &quad.frames)?;
    info!("Combined '{}' -> {}", pair.base_name, out_path.display());
    report.quads_written += 1;
    Ok(())
}

fn demux_directory(
    src: &Path,
    dst: &Path,
    names: &[OsString],
    options: ConvertOptions,
    report: &mut ConversionReport,
) -> Result<()> {
    for name in names {
        let src_path = src.join(name);
        let outcome = match name.to_str().and_then(|n| n.strip_suffix(".wav")) {
            Some(base_name) => demux_file(&src_path, dst, name, base_name, report),
            None => copy_file(&src_path, &dst.join(name), report),
        };
        settle(outcome, &src_path, options, report)?;
    }
    Ok(())
}

fn demux_file(
    src_path: &Path,
    dst: &Path,
    name: &OsStr,
    base_name: &str,
    report: &mut ConversionReport,
) -> Result<()> {
    let params = wav::read_parameters(src_path)?;
    if params.channel_count != QUAD_CHANNELS {
        return copy_file(src_path, &dst.join(name), report);
    }

    let quad = wav::read(src_path)?;
    let (left, right) = interleave::demux(&quad)?;

    let left_path = dst.join(pairing::left_name(base_name));
    let right_path = dst.join(pairing::right_name(base_name));
    wav::write(&left_path, &left.params, &left.frames)?;
    if let Err(e) = wav::write(&right_path, &right.params, &right.frames) {
        // A lone half is worse than no output at all
        let _ = fs::remove_file(&left_path);
        return Err(e);
    }
    info!("Split {} -> '{}' L/R", src_path.display(), base_name);
    report.pairs_written += 1;
    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Apply the failure policy to the outcome of one file
fn settle(
    outcome: Result<()>,
    src_path: &Path,
    options: ConvertOptions,
    report: &mut ConversionReport,
) -> Result<()> {
    match (outcome, options.on_error) {
        (Ok(()), _) => Ok(()),
        (Err(e), FailurePolicy::FailFast) => Err(e),
        (Err(e), FailurePolicy::KeepGoing) => {
            error!("{}", e);
            report
                .failed
                .push(e.path().unwrap_or(src_path).to_path_buf());
            Ok(())
        }
    }
}

fn copy_file(src: &Path, dst: &Path, report: &mut ConversionReport) -> Result<()> {
    fs::copy(src, dst).map_err(|e| IrError::io(src, e))?;
    debug!("Copied {}", src.display());
    report.files_copied += 1;
    Ok(())
}

/// Names of the regular files directly inside `dir`, sorted.
///
/// Symlinks to files count as files; subdirectories are left to the
/// outer walk.
fn list_files(dir: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_os_string());
        }
    }
    Ok(names)
}

/// Canonical output root when it sits strictly inside the input tree
fn nested_output(indir: &Path, outdir: &Path) -> Result<Option<PathBuf>> {
    let input = fs::canonicalize(indir).map_err(|e| IrError::io(indir, e))?;
    let output = fs::canonicalize(outdir).map_err(|e| IrError::io(outdir, e))?;
    if output != input && output.starts_with(&input) {
        Ok(Some(output))
    } else {
        Ok(None)
    }
}

fn is_output_root(entry: &DirEntry, output: Option<&Path>) -> bool {
    match output {
        Some(output) if entry.file_type().is_dir() => fs::canonicalize(entry.path())
            .map(|path| path == output)
            .unwrap_or(false),
        _ => false,
    }
}
