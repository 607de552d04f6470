//! Append-only database writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{DatabaseError, FileRecord};

/// Writes records to a new database file, one line per record.
///
/// # Example
///
/// ```no_run
/// use mediasync::database::{DatabaseWriter, FileRecord};
/// use std::path::Path;
///
/// let mut writer = DatabaseWriter::create(Path::new("music.dat")).unwrap();
/// writer.append(&FileRecord::new("0F-ab", 3, "/music/a.mp3")).unwrap();
/// let written = writer.finish().unwrap();
/// assert_eq!(written, 1);
/// ```
#[derive(Debug)]
pub struct DatabaseWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl DatabaseWriter {
    /// Create (or truncate) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Create`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, DatabaseError> {
        let file = File::create(path).map_err(|source| DatabaseError::Create {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Write`] if writing fails.
    pub fn append(&mut self, record: &FileRecord) -> Result<(), DatabaseError> {
        writeln!(self.out, "{}", record.to_line()).map_err(|source| DatabaseError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered records and close the file.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Write`] if the final flush fails.
    pub fn finish(mut self) -> Result<usize, DatabaseError> {
        self.out.flush().map_err(|source| DatabaseError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.written)
    }
}
