//! Output writers for comparison and duplicate results.
//!
//! This module provides the file formats written by the analysis commands:
//! - [`script`]: POSIX copy scripts for one-way synchronization
//! - [`lists`]: exclusion lists and match tables
//! - [`report`]: the duplicate report
//!
//! # Example
//!
//! ```no_run
//! use mediasync::duplicates::find_duplicates;
//! use mediasync::output::report::DuplicateReportOutput;
//! use std::path::Path;
//!
//! let report = find_duplicates(Path::new("music.dat")).unwrap();
//! let output = DuplicateReportOutput::new(&report.groups);
//! output.write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod lists;
pub mod report;
pub mod script;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use bytesize::ByteSize;

// Re-export main types
pub use lists::{write_match_row, write_path_list};
pub use report::DuplicateReportOutput;
pub use script::CopyScript;

/// Format a byte count for humans (`1.5 MiB`).
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Create an output file with a buffered writer.
///
/// # Errors
///
/// Returns the I/O error from creating the file.
pub fn create_output(path: &Path) -> std::io::Result<BufWriter<File>> {
    File::create(path).map(BufWriter::new)
}
