//! Duplicate detection over a fingerprint database.
//!
//! # Algorithm
//!
//! 1. Read every line, dropping malformed ones (they are reported, never
//!    grouped).
//! 2. Sort the remaining lines by their full text. Lines sharing a
//!    fingerprint share a prefix and therefore end up adjacent.
//! 3. Scan once, remembering the previous record and whether it already
//!    belonged to a group: the first equal pair opens a group, further equal
//!    lines extend it, a different fingerprint closes it.
//! 4. Sort groups by total size, largest first (stable).

use std::path::Path;
use std::time::{Duration, Instant};

use super::groups::{DuplicateGroup, GroupMember};
use crate::database::{DatabaseError, DatabaseReader, FileRecord, MalformedLine};

/// Result of a duplicate search.
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    /// Groups, largest `total_bytes` first
    pub groups: Vec<DuplicateGroup>,
    /// Sum of [`DuplicateGroup::wasted_space`] over all groups, saturating
    pub total_wasted_bytes: u64,
    /// Lines that were skipped as malformed
    pub skipped: Vec<MalformedLine>,
    /// Number of well-formed records examined
    pub records: usize,
    /// Wall clock time of the search
    pub duration: Duration,
}

impl DuplicateReport {
    /// Number of files that belong to some group.
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }
}

/// Find groups of records sharing a fingerprint in the database at `db_path`.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the database cannot be opened or read.
/// Malformed lines are not errors; they end up in [`DuplicateReport::skipped`].
///
/// # Example
///
/// ```no_run
/// use mediasync::duplicates::find_duplicates;
/// use std::path::Path;
///
/// let report = find_duplicates(Path::new("music.dat")).unwrap();
/// for group in &report.groups {
///     println!("{} bytes in {} files", group.total_bytes, group.len());
/// }
/// ```
pub fn find_duplicates(db_path: &Path) -> Result<DuplicateReport, DatabaseError> {
    let start = Instant::now();
    let mut reader = DatabaseReader::open(db_path)?;
    let valid = reader.read_valid_lines()?;

    let records = valid.lines.len();
    let mut lines = valid.lines;
    lines.sort_unstable_by(|a, b| a.text.cmp(&b.text));

    let groups = group_sorted_records(lines.into_iter().map(|line| line.record));
    let total_wasted_bytes = groups
        .iter()
        .map(DuplicateGroup::wasted_space)
        .fold(0u64, u64::saturating_add);

    log::debug!(
        "Grouped {} records of {} into {} groups",
        records,
        db_path.display(),
        groups.len()
    );

    Ok(DuplicateReport {
        groups,
        total_wasted_bytes,
        skipped: valid.malformed,
        records,
        duration: start.elapsed(),
    })
}

/// Group adjacent records with equal fingerprints.
///
/// `records` must be ordered so that equal fingerprints are adjacent. The
/// returned groups are sorted by `total_bytes`, largest first; ties keep
/// their input order.
///
/// # Example
///
/// ```
/// use mediasync::database::FileRecord;
/// use mediasync::duplicates::group_sorted_records;
///
/// let records = vec![
///     FileRecord::new("H1", 100, "/a"),
///     FileRecord::new("H1", 200, "/b"),
///     FileRecord::new("H2", 50, "/c"),
/// ];
/// let groups = group_sorted_records(records);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].total_bytes, 300);
/// ```
pub fn group_sorted_records<I>(records: I) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = FileRecord>,
{
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut previous: Option<FileRecord> = None;
    let mut previous_was_equal = false;

    for record in records {
        let equal = previous
            .as_ref()
            .is_some_and(|p| p.fingerprint == record.fingerprint);

        if equal {
            let member = GroupMember::new(record.path.clone(), record.size);
            if previous_was_equal {
                if let Some(group) = groups.last_mut() {
                    group.push(member);
                }
            } else if let Some(p) = previous.take() {
                groups.push(DuplicateGroup::from_pair(
                    record.fingerprint.clone(),
                    GroupMember::new(p.path, p.size),
                    member,
                ));
            }
        }

        previous_was_equal = equal;
        previous = Some(record);
    }

    groups.sort_by(|a, b| b.total_bytes.cmp(&a.total_bytes));
    groups
}
