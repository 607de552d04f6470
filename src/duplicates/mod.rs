//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping database records that share a fingerprint
//! - Space accounting per group (total and wasted bytes)

pub mod finder;
pub mod groups;

pub use finder::{find_duplicates, group_sorted_records, DuplicateReport};
pub use groups::{DuplicateGroup, GroupMember};
