//! Command-line interface definitions for mediasync.
//!
//! This module defines all CLI arguments and subcommands using the clap
//! derive API. Global options (verbosity, color, config file) apply to every
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # Build a database for each tree
//! mediasync scan home.dat ~/Music
//! mediasync scan usb.dat /mnt/usb/Music
//!
//! # Compare them, writing the outputs to /tmp/sync
//! mediasync comp home.dat usb.dat /tmp/sync
//!
//! # List duplicates within one tree
//! mediasync lsdup home.dat dup.txt
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Find likely-identical media files across file trees.
///
/// Files are identified by a SHA-512 digest over a size dependent sample of
/// their content, ignoring a trailing ID3v1 tag. This makes scanning large
/// collections fast, at the price of a small false-positive rate.
#[derive(Debug, Parser)]
#[command(name = "mediasync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (default: config.toml in the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for mediasync.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print one database line per file
    ///
    /// Each line holds the fingerprint, a space, the size in bytes, a space
    /// and the file path. Identical files get identical fingerprints, and
    /// so do MP3 files that differ only in their ID3v1 tag.
    Hash(HashArgs),

    /// Build a database for all files below the given directories
    Scan(ScanArgs),

    /// Compare two databases
    ///
    /// Writes, named after the databases: only-on-<A>.txt and
    /// only-on-<B>.txt (files only one side has), copy-from-<A>.sh and
    /// copy-from-<B>.sh (scripts copying those files to a destination), and
    /// matches-from-<A>-to-<B>.dat / matches-from-<B>-to-<A>.dat (each path
    /// TAB its first match on the other side).
    Comp(CompArgs),

    /// Report groups of files with equal fingerprints
    Lsdup(LsdupArgs),
}

/// Arguments for the hash subcommand.
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Files to fingerprint
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Database file to create (overwritten if it exists)
    #[arg(value_name = "DB")]
    pub db: PathBuf,

    /// Directories to scan
    #[arg(value_name = "DIR", required = true)]
    pub dirs: Vec<PathBuf>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

/// Arguments for the comp subcommand.
#[derive(Debug, Args)]
pub struct CompArgs {
    /// First database
    #[arg(value_name = "DB_A")]
    pub db_a: PathBuf,

    /// Second database
    #[arg(value_name = "DB_B")]
    pub db_b: PathBuf,

    /// Directory for the output files (default: configured output_dir, or
    /// the current directory)
    #[arg(value_name = "OUTDIR")]
    pub outdir: Option<PathBuf>,

    /// Do not mark the generated copy scripts executable
    #[arg(long)]
    pub no_exec: bool,
}

/// Arguments for the lsdup subcommand.
#[derive(Debug, Args)]
pub struct LsdupArgs {
    /// Database to search
    #[arg(value_name = "DB")]
    pub db: PathBuf,

    /// Report file to write
    #[arg(value_name = "OUTFILE")]
    pub outfile: PathBuf,
}
