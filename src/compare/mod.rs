//! Database comparison.
//!
//! Compares two fingerprint databases and works out, for each side, which
//! records have no counterpart on the other side and which do.
//!
//! # Algorithm
//!
//! Both databases are indexed once ([`FingerprintIndex`]). For every record
//! of one side, in index order, the record is re-read from disk by offset:
//!
//! - fingerprint absent on the other side: the path goes to the exclusion
//!   list and its size is added to the side's exclusive bytes
//! - fingerprint present: the *first* record of the other side carrying it
//!   is re-read and the pair goes to the match table
//!
//! Only fingerprints and offsets are held in memory, plus the exclusive paths
//! of one side (they are sorted before output). Matches are handed to a
//! callback as they are found, so peak memory grows with the number of
//! distinct fingerprints and not with the size of the match tables.
//!
//! # Example
//!
//! ```no_run
//! use mediasync::compare::diff;
//! use std::path::Path;
//!
//! let report = diff(Path::new("home.dat"), Path::new("usb.dat")).unwrap();
//! println!("{} files only at home", report.only_a.len());
//! ```

pub mod prefix;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::database::{DatabaseError, DatabaseReader, FileRecord, FingerprintIndex, MalformedLine};
use crate::output::{
    create_output, format_size, script, write_match_row, write_path_list, CopyScript,
};

pub use prefix::{common_prefix_len, directory_prefix_len};

/// Errors that can occur while comparing two databases.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// An input database could not be opened or read.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// A record re-read by offset no longer carries the indexed fingerprint.
    #[error(
        "Database {path} was modified during comparison \
         (offset {offset}: expected {expected}, found {found})"
    )]
    StaleIndex {
        /// Database path
        path: PathBuf,
        /// Offset that was re-read
        offset: u64,
        /// Fingerprint stored in the index
        expected: String,
        /// Fingerprint found on disk
        found: String,
    },

    /// An output file could not be created or written.
    #[error("Could not write {path}: {source}")]
    Output {
        /// Output path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Per-database statistics of a comparison.
#[derive(Debug, Clone, Default)]
pub struct SideSummary {
    /// Well-formed records in the database
    pub total: usize,
    /// Records without a counterpart on the other side
    pub only_count: usize,
    /// Total size of those records, saturating at `u64::MAX`
    pub only_bytes: u64,
    /// Records with a counterpart on the other side
    pub matched: usize,
    /// Lines skipped as malformed
    pub skipped: Vec<MalformedLine>,
}

/// Exclusive paths and statistics of a comparison.
///
/// Match rows are not part of the summary; [`Comparison::run`] hands them
/// to its callback instead.
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Paths only in A, sorted
    pub only_a: Vec<String>,
    /// Paths only in B, sorted
    pub only_b: Vec<String>,
    /// Statistics for A and B
    pub sides: [SideSummary; 2],
    /// Wall clock time of the comparison
    pub duration: Duration,
}

/// Result of comparing database A with database B, match tables included.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    /// Paths only in A, sorted
    pub only_a: Vec<String>,
    /// Paths only in B, sorted
    pub only_b: Vec<String>,
    /// `(path in A, first matching path in B)` in A's index order
    pub match_a_to_b: Vec<(String, String)>,
    /// `(path in B, first matching path in A)` in B's index order
    pub match_b_to_a: Vec<(String, String)>,
    /// Statistics for A and B
    pub sides: [SideSummary; 2],
    /// Wall clock time of the comparison
    pub duration: Duration,
}

/// Two opened and indexed databases, ready to be compared.
///
/// Opening fails before anything is compared, so callers can create their
/// outputs only once both inputs are known to be readable.
#[derive(Debug)]
pub struct Comparison {
    readers: [DatabaseReader; 2],
    indexes: [FingerprintIndex; 2],
    start: Instant,
}

impl Comparison {
    /// Open and index both databases.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Database`] if either database cannot be
    /// opened or read.
    pub fn open(db_a: &Path, db_b: &Path) -> Result<Self, CompareError> {
        let start = Instant::now();
        let mut reader_a = DatabaseReader::open(db_a)?;
        let mut reader_b = DatabaseReader::open(db_b)?;
        let index_a = FingerprintIndex::build(&mut reader_a)?;
        let index_b = FingerprintIndex::build(&mut reader_b)?;

        Ok(Self {
            readers: [reader_a, reader_b],
            indexes: [index_a, index_b],
            start,
        })
    }

    /// Compare A against B, then B against A.
    ///
    /// `on_match(side, path, partner)` is called for every record of `side`
    /// (0 for A, 1 for B) whose fingerprint exists on the other side, with
    /// the path of the first such record there. Calls arrive in index order.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::StaleIndex`] if a database changed since it
    /// was indexed, and passes on any error returned by `on_match`.
    pub fn run<F>(self, mut on_match: F) -> Result<DiffSummary, CompareError>
    where
        F: FnMut(usize, &str, &str) -> Result<(), CompareError>,
    {
        let Self {
            readers: [mut reader_a, mut reader_b],
            indexes: [index_a, index_b],
            start,
        } = self;

        let (only_a, side_a) = diff_side(
            &mut reader_a,
            &index_a,
            &mut reader_b,
            &index_b,
            |from, to| on_match(0, from, to),
        )?;
        let (only_b, side_b) = diff_side(
            &mut reader_b,
            &index_b,
            &mut reader_a,
            &index_a,
            |from, to| on_match(1, from, to),
        )?;

        Ok(DiffSummary {
            only_a,
            only_b,
            sides: [side_a, side_b],
            duration: start.elapsed(),
        })
    }
}

/// Compare two databases, collecting the match tables in memory.
///
/// [`compare_databases`] streams the tables to disk instead.
///
/// # Errors
///
/// Fails if either database cannot be opened or read, or with
/// [`CompareError::StaleIndex`] if a database changes while it is compared.
/// Malformed lines are skipped and counted in [`SideSummary::skipped`].
pub fn diff(db_a: &Path, db_b: &Path) -> Result<DiffReport, CompareError> {
    let mut matches: [Vec<(String, String)>; 2] = Default::default();
    let summary = Comparison::open(db_a, db_b)?.run(|side, from, to| {
        matches[side].push((from.to_string(), to.to_string()));
        Ok(())
    })?;
    let [match_a_to_b, match_b_to_a] = matches;

    Ok(DiffReport {
        only_a: summary.only_a,
        only_b: summary.only_b,
        match_a_to_b,
        match_b_to_a,
        sides: summary.sides,
        duration: summary.duration,
    })
}

fn diff_side<F>(
    own: &mut DatabaseReader,
    own_index: &FingerprintIndex,
    other: &mut DatabaseReader,
    other_index: &FingerprintIndex,
    mut on_match: F,
) -> Result<(Vec<String>, SideSummary), CompareError>
where
    F: FnMut(&str, &str) -> Result<(), CompareError>,
{
    let mut only = Vec::new();
    let mut summary = SideSummary {
        total: own_index.len(),
        skipped: own_index.malformed().to_vec(),
        ..SideSummary::default()
    };

    for (fingerprint, offset) in own_index.iter() {
        let record = fetch(own, fingerprint, offset)?;
        match other_index.first(fingerprint) {
            None => {
                summary.only_bytes = summary.only_bytes.saturating_add(record.size);
                only.push(record.path);
            }
            Some(partner_offset) => {
                let partner = fetch(other, fingerprint, partner_offset)?;
                on_match(&record.path, &partner.path)?;
                summary.matched += 1;
            }
        }
    }

    only.sort();
    summary.only_count = only.len();
    Ok((only, summary))
}

/// Re-read a record and check it still carries the indexed fingerprint.
fn fetch(
    reader: &mut DatabaseReader,
    fingerprint: &str,
    offset: u64,
) -> Result<FileRecord, CompareError> {
    let record = reader.read_record_at(offset)?;
    if record.fingerprint != fingerprint {
        return Err(CompareError::StaleIndex {
            path: reader.path().to_path_buf(),
            offset,
            expected: fingerprint.to_string(),
            found: record.fingerprint,
        });
    }
    Ok(record)
}

/// Options for [`compare_databases`].
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Set mode 755 on the generated copy scripts
    pub mark_executable: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            mark_executable: true,
        }
    }
}

/// Paths of the six files written by [`compare_databases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    /// `only-on-<A>.txt`, `only-on-<B>.txt`
    pub only: [PathBuf; 2],
    /// `copy-from-<A>.sh`, `copy-from-<B>.sh`
    pub copy: [PathBuf; 2],
    /// `matches-from-<A>-to-<B>.dat`, `matches-from-<B>-to-<A>.dat`
    pub matches: [PathBuf; 2],
}

impl OutputNames {
    /// Derive output names from the database file names.
    ///
    /// The base name is the file name with a trailing `.dat` removed. Equal
    /// base names get `-1` and `-2` appended so the outputs stay distinct.
    ///
    /// # Example
    ///
    /// ```
    /// use mediasync::compare::OutputNames;
    /// use std::path::Path;
    ///
    /// let names = OutputNames::new(
    ///     Path::new("db/home.dat"),
    ///     Path::new("usb.dat"),
    ///     Path::new("out"),
    /// );
    /// assert_eq!(names.only[0], Path::new("out/only-on-home.txt"));
    /// assert_eq!(names.copy[1], Path::new("out/copy-from-usb.sh"));
    /// assert_eq!(names.matches[0], Path::new("out/matches-from-home-to-usb.dat"));
    /// ```
    #[must_use]
    pub fn new(db_a: &Path, db_b: &Path, out_dir: &Path) -> Self {
        let mut a = base_name(db_a);
        let mut b = base_name(db_b);
        if a == b {
            a.push_str("-1");
            b.push_str("-2");
        }

        Self {
            only: [
                out_dir.join(format!("only-on-{a}.txt")),
                out_dir.join(format!("only-on-{b}.txt")),
            ],
            copy: [
                out_dir.join(format!("copy-from-{a}.sh")),
                out_dir.join(format!("copy-from-{b}.sh")),
            ],
            matches: [
                out_dir.join(format!("matches-from-{a}-to-{b}.dat")),
                out_dir.join(format!("matches-from-{b}-to-{a}.dat")),
            ],
        }
    }

    /// All six paths in the order they are reported.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.only
            .iter()
            .chain(self.copy.iter())
            .chain(self.matches.iter())
            .map(PathBuf::as_path)
    }
}

fn base_name(db: &Path) -> String {
    let name = db
        .file_name()
        .map_or_else(|| db.to_string_lossy(), |n| n.to_string_lossy())
        .into_owned();
    match name.strip_suffix(".dat") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

/// Result of [`compare_databases`].
#[derive(Debug, Clone)]
pub struct CompareOutcome {
    /// Exclusive paths and statistics
    pub summary: DiffSummary,
    /// Where the outputs were written
    pub names: OutputNames,
}

/// Compare two databases and write exclusion lists, copy scripts and match
/// tables for both directions into `out_dir`.
///
/// Match tables are written while the comparison runs. Nothing is created
/// if an input cannot be opened; if a database changes mid-run the match
/// tables may be left incomplete.
///
/// # Errors
///
/// Fails if an input cannot be read (see [`diff`]) or an output cannot be
/// written. Failing to mark a script executable is only logged.
pub fn compare_databases(
    db_a: &Path,
    db_b: &Path,
    out_dir: &Path,
    options: &CompareOptions,
) -> Result<CompareOutcome, CompareError> {
    let comparison = Comparison::open(db_a, db_b)?;
    let names = OutputNames::new(db_a, db_b, out_dir);

    let mut tables = [open_file(&names.matches[0])?, open_file(&names.matches[1])?];
    let summary = comparison.run(|side, from, to| {
        write_match_row(&mut tables[side], from, to)
            .map_err(|source| output_error(&names.matches[side], source))
    })?;
    for (table, path) in tables.iter_mut().zip(&names.matches) {
        table.flush().map_err(|source| output_error(path, source))?;
    }

    let only = [&summary.only_a, &summary.only_b];
    let ordinal = ["first", "second"];

    for f in 0..2 {
        let side = &summary.sides[f];
        log::info!(
            "{} of {} files are only in {} DB. They take {}.",
            side.only_count,
            side.total,
            ordinal[f],
            format_size(side.only_bytes)
        );
        if !side.skipped.is_empty() {
            log::warn!(
                "Skipped {} malformed lines in {} DB",
                side.skipped.len(),
                ordinal[f]
            );
        }

        write_file(&names.only[f], |w| write_path_list(w, only[f].as_slice()))?;
        write_file(&names.copy[f], |w| CopyScript::new(only[f]).write_to(w))?;

        if options.mark_executable {
            if let Err(e) = script::set_executable(&names.copy[f]) {
                log::warn!(
                    "Could not mark {} as executable: {}",
                    names.copy[f].display(),
                    e
                );
            }
        }
    }

    log::info!(
        "Comparison done in about {} ms.",
        summary.duration.as_millis()
    );
    for path in names.iter() {
        log::info!("  {}", path.display());
    }

    Ok(CompareOutcome { summary, names })
}

fn output_error(path: &Path, source: std::io::Error) -> CompareError {
    CompareError::Output {
        path: path.to_path_buf(),
        source,
    }
}

fn open_file(path: &Path) -> Result<BufWriter<File>, CompareError> {
    create_output(path).map_err(|source| output_error(path, source))
}

fn write_file<F>(path: &Path, body: F) -> Result<(), CompareError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut writer = open_file(path)?;
    body(&mut writer).map_err(|source| output_error(path, source))?;
    writer.flush().map_err(|source| output_error(path, source))
}
