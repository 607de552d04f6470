//! Fingerprint to line-offset index.
//!
//! The index keeps only fingerprints and byte offsets in memory. Full records
//! are fetched lazily with [`DatabaseReader::read_record_at`], so memory grows
//! with the number of distinct fingerprints rather than with the size of the
//! database.

use std::collections::BTreeMap;

use super::{DatabaseError, DatabaseReader, MalformedLine};

/// Maps each fingerprint to the offsets of every line carrying it.
///
/// Iteration is deterministic: ascending fingerprint, then file order.
/// The first offset of a fingerprint is its "first match".
#[derive(Debug, Clone, Default)]
pub struct FingerprintIndex {
    offsets: BTreeMap<String, Vec<u64>>,
    len: usize,
    malformed: Vec<MalformedLine>,
}

impl FingerprintIndex {
    /// Build the index for an open database.
    ///
    /// Malformed lines are logged, excluded from the index and kept as
    /// diagnostics (see [`FingerprintIndex::malformed`]).
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Read`] on I/O failure.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasync::database::{DatabaseReader, FingerprintIndex};
    /// use std::path::Path;
    ///
    /// let mut reader = DatabaseReader::open(Path::new("music.dat")).unwrap();
    /// let index = FingerprintIndex::build(&mut reader).unwrap();
    /// for (fingerprint, offset) in index.iter() {
    ///     let record = reader.read_record_at(offset).unwrap();
    ///     assert_eq!(record.fingerprint, fingerprint);
    /// }
    /// ```
    pub fn build(reader: &mut DatabaseReader) -> Result<Self, DatabaseError> {
        let path = reader.path().to_path_buf();
        let mut index = Self::default();

        for line in reader.lines()? {
            let line = line?;
            match line.parse() {
                Ok(record) => index.insert(record.fingerprint, line.offset),
                Err(bad) => {
                    log::warn!("{}: {}", path.display(), bad);
                    index.malformed.push(bad);
                }
            }
        }

        log::debug!(
            "Indexed {}: {} records, {} distinct fingerprints, {} skipped",
            path.display(),
            index.len,
            index.offsets.len(),
            index.malformed.len()
        );

        Ok(index)
    }

    /// Add one entry.
    pub fn insert(&mut self, fingerprint: String, offset: u64) {
        self.offsets.entry(fingerprint).or_default().push(offset);
        self.len += 1;
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.offsets.len()
    }

    /// All offsets of a fingerprint, in file order.
    #[must_use]
    pub fn get(&self, fingerprint: &str) -> Option<&[u64]> {
        self.offsets.get(fingerprint).map(Vec::as_slice)
    }

    /// Offset of the first line carrying `fingerprint`.
    #[must_use]
    pub fn first(&self, fingerprint: &str) -> Option<u64> {
        self.get(fingerprint).and_then(|offsets| offsets.first().copied())
    }

    /// Whether any record carries `fingerprint`.
    #[must_use]
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.offsets.contains_key(fingerprint)
    }

    /// Iterate over `(fingerprint, offset)` for every indexed record.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.offsets.iter().flat_map(|(fingerprint, offsets)| {
            offsets
                .iter()
                .map(move |&offset| (fingerprint.as_str(), offset))
        })
    }

    /// Lines that were excluded while building.
    #[must_use]
    pub fn malformed(&self) -> &[MalformedLine] {
        &self.malformed
    }
}
