//! Plain text list outputs of a database comparison.
//!
//! * exclusion list: one path per line
//! * match table: `<path> TAB <matching path>` per line

use std::io::Write;

/// Write one path per line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_path_list<W: Write, S: AsRef<str>>(
    writer: &mut W,
    paths: &[S],
) -> std::io::Result<()> {
    for path in paths {
        writeln!(writer, "{}", path.as_ref())?;
    }
    Ok(())
}

/// Append one row to a match table.
///
/// Rows are written as matches are found, so a table never has to be held
/// in memory.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_match_row<W: Write>(writer: &mut W, from: &str, to: &str) -> std::io::Result<()> {
    writeln!(writer, "{from}\t{to}")
}
