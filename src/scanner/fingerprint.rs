//! Sample-based file fingerprinting.
//!
//! # Overview
//!
//! A fingerprint identifies a file by a deterministic sample of its bytes
//! instead of its full content. The sample is chosen by size tier:
//!
//! | Tier | File size (payload)      | Sample                                   |
//! |------|--------------------------|------------------------------------------|
//! | `0F` | < 100 KiB                | every byte before the trailer            |
//! | `01` | < 1 MiB                  | last 100 KiB before the trailer          |
//! | `02` | < 100 MiB                | last 1 MiB before the trailer            |
//! | `03` | >= 100 MiB               | 1 MiB ending 50 MiB before the trailer   |
//!
//! A "trailer" is a 128 byte legacy metadata block starting with `TAG` (ID3v1).
//! It is excluded from the sample so that two files differing only in their
//! tags still share a fingerprint.
//!
//! The sample is digested with SHA-512 and rendered as lowercase hex behind the
//! tier tag, e.g. `02-3f9a...`. Different tiers can never produce equal
//! fingerprints because the tags differ.
//!
//! # Example
//!
//! ```no_run
//! use mediasync::scanner::fingerprint_file;
//! use std::path::Path;
//!
//! let fp = fingerprint_file(Path::new("song.mp3")).unwrap();
//! println!("{} {}", fp.fingerprint, fp.size);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha512};

/// Size of the legacy trailing metadata block.
pub const TRAILER_SIZE: u64 = 128;

/// Marker at the start of a legacy trailing metadata block.
pub const TRAILER_MARKER: &[u8; 3] = b"TAG";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Payload size below which the whole payload is hashed.
pub const FULL_HASH_LIMIT: u64 = 100 * KIB;
/// Payload size below which the last 100 KiB are hashed.
pub const SMALL_TAIL_LIMIT: u64 = MIB;
/// Payload size below which the last 1 MiB is hashed.
pub const LARGE_TAIL_LIMIT: u64 = 100 * MIB;
/// Distance from the end of the payload for the deepest tier.
pub const DEEP_SKIPBACK: u64 = 50 * MIB;

/// Length of the hex digest part of a fingerprint (SHA-512).
pub const DIGEST_HEX_LEN: usize = 128;

/// Sampling tier selected by file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Whole payload (`0F-`).
    Full,
    /// Last 100 KiB of the payload (`01-`).
    SmallTail,
    /// Last 1 MiB of the payload (`02-`).
    LargeTail,
    /// 1 MiB ending 50 MiB before the end of the payload (`03-`).
    Deep,
}

impl Tier {
    /// Three character prefix written in front of the digest.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Full => "0F-",
            Self::SmallTail => "01-",
            Self::LargeTail => "02-",
            Self::Deep => "03-",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The byte range of a file that gets digested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePlan {
    /// Selected tier
    pub tier: Tier,
    /// Absolute offset of the first sampled byte
    pub offset: u64,
    /// Number of bytes to sample
    pub len: u64,
}

impl SamplePlan {
    /// Choose the sample for a file of `size` bytes with a detected trailer of
    /// `trailer` bytes (0 or [`TRAILER_SIZE`]).
    ///
    /// The sample always ends exactly `skipback` bytes before end of file.
    /// Returns `None` if the file is too short for the computed range, which
    /// can only happen for inconsistent input (`trailer > size`).
    ///
    /// # Example
    ///
    /// ```
    /// use mediasync::scanner::fingerprint::{SamplePlan, Tier};
    ///
    /// let plan = SamplePlan::for_size(2 * 1024 * 1024, 0).unwrap();
    /// assert_eq!(plan.tier, Tier::LargeTail);
    /// assert_eq!(plan.len, 1024 * 1024);
    /// assert_eq!(plan.offset, 1024 * 1024);
    /// ```
    #[must_use]
    pub fn for_size(size: u64, trailer: u64) -> Option<Self> {
        let (tier, len, skipback) = if size < FULL_HASH_LIMIT + trailer {
            (Tier::Full, size.checked_sub(trailer)?, trailer)
        } else if size < SMALL_TAIL_LIMIT + trailer {
            (Tier::SmallTail, 100 * KIB, trailer)
        } else if size < LARGE_TAIL_LIMIT + trailer {
            (Tier::LargeTail, MIB, trailer)
        } else {
            (Tier::Deep, MIB, trailer + DEEP_SKIPBACK)
        };

        let offset = size.checked_sub(len)?.checked_sub(skipback)?;
        Some(Self { tier, offset, len })
    }
}

/// Result of fingerprinting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    /// Tier tag followed by the hex digest
    pub fingerprint: String,
    /// File size in bytes (including any trailer)
    pub size: u64,
    /// Tier the sample was taken from
    pub tier: Tier,
}

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The file could not be opened or its size determined.
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        /// Path of the file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Fewer bytes than planned could be read (file shrank or is inconsistent).
    #[error("Short read on {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Path of the file
        path: PathBuf,
        /// Bytes the sample plan asked for
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },
}

/// Fingerprint a single file.
///
/// # Errors
///
/// Returns [`FingerprintError::Unreadable`] if the file cannot be opened,
/// its size cannot be determined or a read fails, and
/// [`FingerprintError::ShortRead`] if fewer bytes than planned are available.
pub fn fingerprint_file(path: &Path) -> Result<FileFingerprint, FingerprintError> {
    let unreadable = |source: io::Error| FingerprintError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(unreadable)?;
    let size = file.metadata().map_err(unreadable)?.len();

    let trailer = if has_trailer(&mut file, size).map_err(unreadable)? {
        log::trace!("Trailer found in {}", path.display());
        TRAILER_SIZE
    } else {
        0
    };

    let plan =
        SamplePlan::for_size(size, trailer).ok_or_else(|| FingerprintError::ShortRead {
            path: path.to_path_buf(),
            expected: trailer,
            actual: size,
        })?;

    let digest = digest_range(&mut file, plan.offset, plan.len).map_err(unreadable)?;
    if digest.bytes_read != plan.len {
        return Err(FingerprintError::ShortRead {
            path: path.to_path_buf(),
            expected: plan.len,
            actual: digest.bytes_read,
        });
    }

    log::trace!(
        "Fingerprinted {} ({} bytes, tier {}, sample {}+{})",
        path.display(),
        size,
        plan.tier,
        plan.offset,
        plan.len
    );

    Ok(FileFingerprint {
        fingerprint: format!("{}{}", plan.tier.tag(), digest.hex),
        size,
        tier: plan.tier,
    })
}

/// Check whether the last [`TRAILER_SIZE`] bytes start with [`TRAILER_MARKER`].
fn has_trailer<R: Read + Seek>(reader: &mut R, size: u64) -> io::Result<bool> {
    if size < TRAILER_SIZE {
        return Ok(false);
    }

    reader.seek(SeekFrom::Start(size - TRAILER_SIZE))?;
    let mut marker = [0u8; 3];
    match reader.read_exact(&mut marker) {
        Ok(()) => Ok(&marker == TRAILER_MARKER),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

struct RangeDigest {
    hex: String,
    bytes_read: u64,
}

/// Stream `len` bytes starting at `offset` into SHA-512.
fn digest_range<R: Read + Seek>(reader: &mut R, offset: u64, len: u64) -> io::Result<RangeDigest> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut hasher = Sha512::new();
    let bytes_read = io::copy(&mut reader.by_ref().take(len), &mut hasher)?;
    Ok(RangeDigest {
        hex: format!("{:x}", hasher.finalize()),
        bytes_read,
    })
}
