//! Duplicate groups and their space accounting.
//!
//! # Example
//!
//! ```
//! use mediasync::duplicates::{DuplicateGroup, GroupMember};
//!
//! let mut group = DuplicateGroup::from_pair(
//!     "01-ab",
//!     GroupMember::new("/a", 100),
//!     GroupMember::new("/b", 200),
//! );
//! assert_eq!(group.total_bytes, 300);
//! assert_eq!(group.wasted_space(), 100);
//!
//! group.push(GroupMember::new("/c", 200));
//! assert_eq!(group.len(), 3);
//! ```

/// One file of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    /// Path as stored in the database
    pub path: String,
    /// Size as stored in the database
    pub size: u64,
}

impl GroupMember {
    /// Create a new member.
    #[must_use]
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Files sharing one fingerprint.
///
/// A group always has at least two members. Sizes may differ between
/// members because a fingerprint only covers a sample of each file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The shared fingerprint
    pub fingerprint: String,
    /// Sum of member sizes
    pub total_bytes: u64,
    /// Members in database sort order
    pub members: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Open a group from the first two equal records.
    ///
    /// Totals saturate at `u64::MAX`.
    #[must_use]
    pub fn from_pair(
        fingerprint: impl Into<String>,
        first: GroupMember,
        second: GroupMember,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            total_bytes: first.size.saturating_add(second.size),
            members: vec![first, second],
        }
    }

    /// Extend the group with another member.
    pub fn push(&mut self, member: GroupMember) {
        self.total_bytes = self.total_bytes.saturating_add(member.size);
        self.members.push(member);
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for groups built by the grouper.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The member that would be kept: the largest one.
    #[must_use]
    pub fn representative(&self) -> Option<&GroupMember> {
        self.members.iter().max_by_key(|m| m.size)
    }

    /// Bytes taken by every member except the representative.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        let kept = self.representative().map_or(0, |m| m.size);
        self.total_bytes.saturating_sub(kept)
    }

    /// Member paths in group order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.path.as_str())
    }
}
