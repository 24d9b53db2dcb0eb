//! irquad CLI
//!
//! Converts directories of true stereo impulse responses between split
//! `"<base> L.wav"`/`"<base> R.wav"` pairs and 4-channel `"<base>.wav"` files.

use std::fs;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use irquad::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let options = cli.options();
    info!(
        "irquad v{}: {:?} {} -> {}",
        env!("CARGO_PKG_VERSION"),
        options.mode,
        cli.indir.display(),
        cli.outdir.display()
    );

    let report = irquad::convert(&cli.indir, &cli.outdir, options).with_context(|| {
        format!(
            "Failed to convert {} into {}",
            cli.indir.display(),
            cli.outdir.display()
        )
    })?;

    info!(
        "Done: {} directories, {} quad files, {} split pairs, {} copied",
        report.directories, report.quads_written, report.pairs_written, report.files_copied
    );
    if !report.skipped_pairs.is_empty() {
        warn!("Skipped mismatched pairs: {}", report.skipped_pairs.join(", "));
    }
    if !report.failed.is_empty() {
        warn!("{} files failed", report.failed.len());
    }

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }

    Ok(())
}
