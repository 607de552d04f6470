//! Database reader with sequential and random access.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::{parse_line, DatabaseError, FileRecord, MalformedLine};

/// One raw line of a database together with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based line number
    pub number: usize,
    /// Byte offset of the first character of the line
    pub offset: u64,
    /// Line text without the terminating newline
    pub text: String,
}

impl RawLine {
    /// Parse the line into a record.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedLine`] diagnostic if the line cannot be parsed.
    pub fn parse(&self) -> Result<FileRecord, MalformedLine> {
        parse_line(&self.text).map_err(|reason| MalformedLine {
            line: self.number,
            text: self.text.clone(),
            reason,
        })
    }
}

/// A line that parsed, kept with its text so callers can order by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidLine {
    /// Line text without the terminating newline
    pub text: String,
    /// The parsed record
    pub record: FileRecord,
}

/// Well-formed lines of a database plus the diagnostics for the rest.
#[derive(Debug, Clone, Default)]
pub struct ValidLines {
    /// Every line that parsed, in file order
    pub lines: Vec<ValidLine>,
    /// Lines that were rejected
    pub malformed: Vec<MalformedLine>,
}

/// Read access to one database file.
///
/// The file handle lives as long as the reader and is released on drop.
#[derive(Debug)]
pub struct DatabaseReader {
    path: PathBuf,
    inner: BufReader<File>,
}

impl DatabaseReader {
    /// Open the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Open`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let file = File::open(path).map_err(|source| DatabaseError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            inner: BufReader::new(file),
        })
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterate over all non-blank lines from the start of the file.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Read`] if the file cannot be rewound.
    pub fn lines(&mut self) -> Result<Lines<'_>, DatabaseError> {
        self.inner
            .rewind()
            .map_err(|source| self.read_error(source))?;

        Ok(Lines {
            reader: self,
            offset: 0,
            number: 0,
            buf: Vec::new(),
        })
    }

    /// Parse every line sequentially.
    ///
    /// Malformed lines are logged and returned alongside the records.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Read`] on I/O failure.
    pub fn read_records(
        &mut self,
    ) -> Result<(Vec<FileRecord>, Vec<MalformedLine>), DatabaseError> {
        let mut records = Vec::new();
        let mut malformed = Vec::new();
        let path = self.path.clone();

        for line in self.lines()? {
            match line?.parse() {
                Ok(record) => records.push(record),
                Err(bad) => {
                    log::warn!("{}: {}", path.display(), bad);
                    malformed.push(bad);
                }
            }
        }

        Ok((records, malformed))
    }

    /// Read every well-formed line with its record, filtering malformed ones out.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Read`] on I/O failure.
    pub fn read_valid_lines(&mut self) -> Result<ValidLines, DatabaseError> {
        let mut valid = ValidLines::default();
        let path = self.path.clone();

        for line in self.lines()? {
            let line = line?;
            match line.parse() {
                Ok(record) => valid.lines.push(ValidLine {
                    text: line.text,
                    record,
                }),
                Err(bad) => {
                    log::warn!("{}: {}", path.display(), bad);
                    valid.malformed.push(bad);
                }
            }
        }

        Ok(valid)
    }

    /// Re-read the record whose line starts at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Read`] on I/O failure and
    /// [`DatabaseError::Changed`] if no valid record starts at `offset`.
    pub fn read_record_at(&mut self, offset: u64) -> Result<FileRecord, DatabaseError> {
        self.inner
            .seek(SeekFrom::Start(offset))
            .map_err(|source| self.read_error(source))?;

        let mut buf = Vec::new();
        let n = self
            .inner
            .read_until(b'\n', &mut buf)
            .map_err(|source| self.read_error(source))?;
        if n == 0 {
            return Err(self.changed(offset));
        }

        let text = decode_line(&buf);
        parse_line(&text).map_err(|_| self.changed(offset))
    }

    fn read_error(&self, source: std::io::Error) -> DatabaseError {
        DatabaseError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn changed(&self, offset: u64) -> DatabaseError {
        DatabaseError::Changed {
            path: self.path.clone(),
            offset,
        }
    }
}

/// Iterator over the non-blank lines of a database.
///
/// Created by [`DatabaseReader::lines`].
pub struct Lines<'a> {
    reader: &'a mut DatabaseReader,
    offset: u64,
    number: usize,
    buf: Vec<u8>,
}

impl Iterator for Lines<'_> {
    type Item = Result<RawLine, DatabaseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            let n = match self.reader.inner.read_until(b'\n', &mut self.buf) {
                Ok(n) => n,
                Err(source) => return Some(Err(self.reader.read_error(source))),
            };
            if n == 0 {
                return None;
            }

            let offset = self.offset;
            self.offset += n as u64;
            self.number += 1;

            let text = decode_line(&self.buf);
            if text.is_empty() {
                log::trace!("Skipping blank line {}", self.number);
                continue;
            }

            return Some(Ok(RawLine {
                number: self.number,
                offset,
                text,
            }));
        }
    }
}

/// Strip the newline and decode lossily, so a stray invalid byte in one path
/// does not abort the whole run.
fn decode_line(buf: &[u8]) -> String {
    let bytes = buf.strip_suffix(b"\n").unwrap_or(buf);
    String::from_utf8_lossy(bytes).into_owned()
}
