//! Copy script generation for one-way synchronization.
//!
//! The generated POSIX shell script copies every file listed as missing
//! into a destination root given as its first argument, recreating the
//! directory layout below the paths' common directory prefix.
//!
//! # Layout
//!
//! ```text
//! #!/bin/sh
//! dest="$1"
//! if [ -z "$dest" ]; then
//!     echo "usage: $0 /mnt/destination/path"
//!     exit 1
//! fi
//! mkdir -p "$dest/rock"
//! cp "/music/rock/a.mp3" "$dest/rock/a.mp3"
//! ```
//!
//! # Usage
//!
//! ```
//! use mediasync::output::script::CopyScript;
//!
//! let missing = vec!["/music/rock/a.mp3".to_string(), "/music/rock/b.mp3".to_string()];
//! let script = CopyScript::new(&missing);
//! let mut buffer = Vec::new();
//! script.write_to(&mut buffer).unwrap();
//! let text = String::from_utf8(buffer).unwrap();
//! assert!(text.contains("cp \"/music/rock/a.mp3\" \"$dest/a.mp3\""));
//! ```

use std::io::Write;
use std::path::Path;

use crate::compare::directory_prefix_len;

/// Formatter for a copy script.
pub struct CopyScript<'a> {
    /// Sorted paths of the files to copy
    pub paths: &'a [String],
    /// Bytes stripped from the front of every path
    pub prefix_len: usize,
}

impl<'a> CopyScript<'a> {
    /// Create a script for `paths`, which must already be sorted.
    #[must_use]
    pub fn new(paths: &'a [String]) -> Self {
        Self {
            paths,
            prefix_len: directory_prefix_len(paths),
        }
    }

    /// Path of `path` relative to the destination root.
    #[must_use]
    pub fn relative<'p>(&self, path: &'p str) -> &'p str {
        path.get(self.prefix_len..).unwrap_or(path)
    }

    /// Write the generated script to a writer.
    ///
    /// One `mkdir -p` line is emitted per run of equal directories (only
    /// consecutive duplicates are skipped), then one `cp` line per path.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "#!/bin/sh")?;
        writeln!(writer, "dest=\"$1\"")?;
        writeln!(writer, "if [ -z \"$dest\" ]; then")?;
        writeln!(writer, "    echo \"usage: $0 /mnt/destination/path\"")?;
        writeln!(writer, "    exit 1")?;
        writeln!(writer, "fi")?;

        let mut last_dir: Option<&str> = None;
        for path in self.paths {
            let dir = parent_of(self.relative(path));
            if last_dir != Some(dir) {
                writeln!(writer, "mkdir -p \"$dest/{}\"", escape_double_quoted(dir))?;
                last_dir = Some(dir);
            }
        }

        for path in self.paths {
            writeln!(
                writer,
                "cp \"{}\" \"$dest/{}\"",
                escape_double_quoted(path),
                escape_double_quoted(self.relative(path))
            )?;
        }

        Ok(())
    }
}

/// Directory part of a relative path (empty when there is no `/`).
fn parent_of(relative: &str) -> &str {
    relative.rfind('/').map_or("", |i| &relative[..i])
}

/// Escape a string for use inside a double-quoted shell word.
///
/// Backslash, double quote, dollar and backtick keep their special meaning
/// inside double quotes, so each one is prefixed with a backslash.
#[must_use]
pub fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Mark a generated script as executable (mode 755).
///
/// # Errors
///
/// Returns the I/O error from changing permissions. Callers treat this as
/// non-fatal.
#[cfg(unix)]
pub fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

/// No-op on platforms without POSIX permissions.
///
/// # Errors
///
/// Never fails.
#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
