//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Depth-first directory walking using walkdir
//! - Sample-based SHA-512 fingerprinting
//! - Building a fingerprint database from one or more directory trees
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`fingerprint`]: Tiered sampling and digesting of a single file
//!
//! # Example
//!
//! ```no_run
//! use mediasync::scanner::{Walker, WalkerConfig, fingerprint_file};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => match fingerprint_file(&path) {
//!             Ok(fp) => println!("{} {} {}", fp.fingerprint, fp.size, path.display()),
//!             Err(e) => eprintln!("Warning: {}", e),
//!         },
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod fingerprint;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::database::{DatabaseError, DatabaseWriter, FileRecord};
use crate::progress::ProgressCallback;

// Re-export main types
pub use fingerprint::{fingerprint_file, FileFingerprint, FingerprintError, SamplePlan, Tier};
pub use walker::Walker;

/// Configuration for directory walking.
///
/// Controls symlink handling and hidden file filtering.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `follow_symlinks` - Whether to follow symbolic links
    /// * `skip_hidden` - Whether to skip hidden files
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file or directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Statistics from building a database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Records written to the database
    pub files_written: usize,
    /// Files that could not be fingerprinted
    pub files_failed: usize,
    /// Directories or entries the walker could not read
    pub walk_errors: usize,
    /// Wall clock time of the scan
    pub duration: Duration,
}

impl ScanSummary {
    /// Whether anything had to be skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.files_failed > 0 || self.walk_errors > 0
    }
}

/// Fingerprint one file into a database record.
///
/// # Errors
///
/// Propagates [`FingerprintError`] from the fingerprint engine.
pub fn record_for(path: &Path) -> Result<FileRecord, FingerprintError> {
    let fp = fingerprint_file(path)?;
    Ok(FileRecord::new(
        fp.fingerprint,
        fp.size,
        path.to_string_lossy().into_owned(),
    ))
}

/// Walk every root and write one record per regular file to `db_path`.
///
/// Records are appended as files are discovered; nothing is buffered beyond
/// the writer. Unreadable files and directories are logged and counted.
///
/// # Errors
///
/// Returns an error only if the database cannot be created or written.
pub fn scan_to_database(
    db_path: &Path,
    roots: &[PathBuf],
    config: &WalkerConfig,
    progress: Option<&dyn ProgressCallback>,
) -> Result<ScanSummary, DatabaseError> {
    let start = Instant::now();
    let mut writer = DatabaseWriter::create(db_path)?;
    let mut summary = ScanSummary::default();
    let mut seen = 0usize;

    if let Some(p) = progress {
        p.on_phase_start("scanning", 0);
    }

    for root in roots {
        log::debug!("Scanning {}", root.display());
        let walker = Walker::new(root, config.clone());

        for entry in walker.walk() {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping: {}", e);
                    summary.walk_errors += 1;
                    continue;
                }
            };

            seen += 1;
            if let Some(p) = progress {
                p.on_progress(seen, &path.to_string_lossy());
            }

            match record_for(&path) {
                Ok(record) => {
                    writer.append(&record)?;
                    summary.files_written += 1;
                    if let Some(p) = progress {
                        p.on_item_completed(record.size);
                    }
                }
                Err(e) => {
                    log::warn!("{}", e);
                    summary.files_failed += 1;
                }
            }
        }
    }

    writer.finish()?;

    if let Some(p) = progress {
        p.on_phase_end("scanning");
    }

    summary.duration = start.elapsed();
    Ok(summary)
}
