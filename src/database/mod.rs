//! Fingerprint database format.
//!
//! A database is a UTF-8 text file with one record per line:
//!
//! ```text
//! <fingerprint> <size_bytes> <path>
//! ```
//!
//! The path is the remainder of the line and may contain spaces. Newlines in
//! a path (or fingerprint) are replaced by a space when written, since the
//! newline terminates a record.
//!
//! # Access modes
//!
//! - [`DatabaseReader::read_records`]: sequential parse of every line
//! - [`FingerprintIndex`]: fingerprint to byte offsets, with
//!   [`DatabaseReader::read_record_at`] for re-reading a record later
//!
//! Malformed lines never abort a run. They are reported as [`MalformedLine`]
//! diagnostics and left out of every index.

pub mod index;
pub mod reader;
pub mod writer;

use std::fmt;
use std::path::PathBuf;

pub use index::FingerprintIndex;
pub use reader::{DatabaseReader, Lines, RawLine, ValidLine, ValidLines};
pub use writer::DatabaseWriter;

/// One line of a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Composite fingerprint (tier tag + hex digest)
    pub fingerprint: String,
    /// File size in bytes
    pub size: u64,
    /// File path as it was scanned
    pub path: String,
}

impl FileRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(fingerprint: impl Into<String>, size: u64, path: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            size,
            path: path.into(),
        }
    }

    /// Render the record as one database line (without the terminating newline).
    ///
    /// # Example
    ///
    /// ```
    /// use mediasync::database::FileRecord;
    ///
    /// let record = FileRecord::new("0F-ab", 3, "/music/a\nb.mp3");
    /// assert_eq!(record.to_line(), "0F-ab 3 /music/a b.mp3");
    /// ```
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {}",
            sanitize(&self.fingerprint),
            self.size,
            sanitize(&self.path)
        )
    }
}

fn sanitize(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains('\n') {
        std::borrow::Cow::Owned(field.replace('\n', " "))
    } else {
        std::borrow::Cow::Borrowed(field)
    }
}

/// Why a database line could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No space at all.
    #[error("no space found")]
    MissingSeparator,

    /// Only one space, so size and path cannot be separated.
    #[error("no second space found")]
    MissingSecondSeparator,

    /// The line starts with a space.
    #[error("empty fingerprint")]
    EmptyFingerprint,

    /// The size field is not an unsigned integer.
    #[error("invalid size '{0}'")]
    InvalidSize(String),

    /// Nothing follows the second space.
    #[error("empty path")]
    EmptyPath,
}

/// A line that was skipped because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number
    pub line: usize,
    /// The offending text
    pub text: String,
    /// Why it was rejected
    pub reason: FormatError,
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ignored improperly formatted line {} \"{}\" ({})",
            self.line, self.text, self.reason
        )
    }
}

/// Parse one database line (without its newline).
///
/// The line is split at the first and the second space; everything after the
/// second space is the path.
///
/// # Errors
///
/// Returns a [`FormatError`] describing the first problem found.
///
/// # Example
///
/// ```
/// use mediasync::database::{parse_line, FormatError};
///
/// let record = parse_line("0F-ab 42 /music/my song.mp3").unwrap();
/// assert_eq!(record.size, 42);
/// assert_eq!(record.path, "/music/my song.mp3");
///
/// assert_eq!(parse_line("0F-ab 42"), Err(FormatError::MissingSecondSeparator));
/// ```
pub fn parse_line(line: &str) -> Result<FileRecord, FormatError> {
    let (fingerprint, rest) = line.split_once(' ').ok_or(FormatError::MissingSeparator)?;
    let (size, path) = rest
        .split_once(' ')
        .ok_or(FormatError::MissingSecondSeparator)?;

    if fingerprint.is_empty() {
        return Err(FormatError::EmptyFingerprint);
    }
    if path.is_empty() {
        return Err(FormatError::EmptyPath);
    }
    let size = size
        .parse::<u64>()
        .map_err(|_| FormatError::InvalidSize(size.to_string()))?;

    Ok(FileRecord {
        fingerprint: fingerprint.to_string(),
        size,
        path: path.to_string(),
    })
}

/// Errors that can occur while opening, reading or writing a database.
#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    /// The database could not be opened for reading.
    #[error("Could not open database {path} for reading: {source}")]
    Open {
        /// Database path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The database could not be created.
    #[error("Could not create database {path}: {source}")]
    Create {
        /// Database path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading from an open database failed.
    #[error("I/O error reading {path}: {source}")]
    Read {
        /// Database path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A stored offset no longer points at the expected record.
    #[error("Database {path} changed while it was being read (offset {offset})")]
    Changed {
        /// Database path
        path: PathBuf,
        /// Offset that was re-read
        offset: u64,
    },

    /// Writing to an open database failed.
    #[error("I/O error writing {path}: {source}")]
    Write {
        /// Database path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
