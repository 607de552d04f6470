//! mediasync - find likely-identical media files across file trees
//!
//! Builds a portable fingerprint database per directory tree, compares two
//! databases to drive one-way synchronization (exclusion lists, copy scripts,
//! match tables), and finds duplicate files within one database.
//!
//! Fingerprints are SHA-512 digests over a size dependent sample of each
//! file, so large collections can be scanned quickly. Files that differ only
//! in an ID3v1 trailer, or only in unsampled bytes of very large files, get
//! the same fingerprint.

pub mod cli;
pub mod compare;
pub mod config;
pub mod database;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::{Cli, CompArgs, Commands, HashArgs, LsdupArgs, ScanArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{create_output, format_size, DuplicateReportOutput};
use crate::progress::Progress;

/// Run the command described by `cli`.
///
/// Logging is initialized on the first call. Fatal problems are returned as
/// errors; recoverable ones (skipped files, malformed lines) are logged and
/// reflected in the returned [`ExitCode`].
///
/// # Errors
///
/// Returns an error if a database cannot be read or an output cannot be
/// written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    let config = Config::load(cli.config.as_deref());
    log::trace!("Configuration: {:?}", config);

    match cli.command {
        Commands::Hash(args) => run_hash(&args),
        Commands::Scan(args) => run_scan(&args, &config, cli.quiet),
        Commands::Comp(args) => run_comp(&args, &config),
        Commands::Lsdup(args) => run_lsdup(&args),
    }
}

fn run_hash(args: &HashArgs) -> anyhow::Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;

    for path in &args.files {
        match scanner::record_for(path) {
            Ok(record) => {
                writeln!(out, "{}", record.to_line()).context("Could not write to stdout")?;
            }
            Err(e) => {
                log::error!("{}", e);
                failed += 1;
            }
        }
    }
    out.flush().context("Could not write to stdout")?;

    if failed > 0 {
        log::warn!("{} of {} files could not be hashed", failed, args.files.len());
        Ok(ExitCode::GeneralError)
    } else {
        Ok(ExitCode::Success)
    }
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    let mut walker_config = config.walker_config();
    walker_config.follow_symlinks |= args.follow_symlinks;
    walker_config.skip_hidden |= args.skip_hidden;

    let progress = Progress::new(quiet);
    let summary = scanner::scan_to_database(&args.db, &args.dirs, &walker_config, Some(&progress))
        .with_context(|| format!("Could not build database {}", args.db.display()))?;

    log::info!(
        "Wrote {} records ({}) to {} in about {} ms.",
        summary.files_written,
        format_size(progress.bytes()),
        args.db.display(),
        summary.duration.as_millis()
    );

    if summary.has_errors() {
        log::warn!(
            "Skipped {} unreadable files and {} unreadable directories",
            summary.files_failed,
            summary.walk_errors
        );
        Ok(ExitCode::PartialSuccess)
    } else {
        Ok(ExitCode::Success)
    }
}

fn run_comp(args: &CompArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let out_dir = args
        .outdir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut options = config.compare_options();
    if args.no_exec {
        options.mark_executable = false;
    }

    compare::compare_databases(&args.db_a, &args.db_b, &out_dir, &options).with_context(|| {
        format!(
            "Could not compare {} with {}",
            args.db_a.display(),
            args.db_b.display()
        )
    })?;

    Ok(ExitCode::Success)
}

fn run_lsdup(args: &LsdupArgs) -> anyhow::Result<ExitCode> {
    let report = duplicates::find_duplicates(&args.db)
        .with_context(|| format!("Could not search {} for duplicates", args.db.display()))?;

    write_report(&args.outfile, &report.groups)
        .with_context(|| format!("Could not write report {}", args.outfile.display()))?;

    if !report.skipped.is_empty() {
        log::warn!("Skipped {} malformed lines", report.skipped.len());
    }
    log::info!(
        "Found {} groups of duplicates in about {} ms. Potentially wasting {}. See file \"{}\".",
        report.groups.len(),
        report.duration.as_millis(),
        format_size(report.total_wasted_bytes),
        args.outfile.display()
    );

    Ok(ExitCode::Success)
}

fn write_report(path: &Path, groups: &[duplicates::DuplicateGroup]) -> std::io::Result<()> {
    let mut writer = create_output(path)?;
    DuplicateReportOutput::new(groups).write_to(&mut writer)?;
    writer.flush()
}
