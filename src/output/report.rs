//! Duplicate report output.
//!
//! Every group is written as a `# <size>` header with its human readable
//! total, one member path per line, and a blank separator line:
//!
//! ```text
//! # 300 B
//! /music/a.mp3
//! /backup/a.mp3
//!
//! ```

use std::io::Write;

use crate::duplicates::DuplicateGroup;
use crate::output::format_size;

/// Formatter for the duplicate report.
pub struct DuplicateReportOutput<'a> {
    /// Groups in report order
    pub groups: &'a [DuplicateGroup],
}

impl<'a> DuplicateReportOutput<'a> {
    /// Create a new report formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the report to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for group in self.groups {
            writeln!(writer, "# {}", format_size(group.total_bytes))?;
            for path in group.paths() {
                writeln!(writer, "{path}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
