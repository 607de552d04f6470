//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the mediasync application.
///
/// - 0: Success
/// - 1: General error (unreadable database, unwritable output, failed hash)
/// - 2: Usage error (missing arguments, unknown action)
/// - 3: Partial success (database built, but some files or directories
///   were skipped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed normally.
    Success = 0,
    /// General error: the command failed.
    GeneralError = 1,
    /// Usage error: the command line could not be parsed.
    UsageError = 2,
    /// Partial success: completed, but some inputs were skipped.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "MS000",
            Self::GeneralError => "MS001",
            Self::UsageError => "MS002",
            Self::PartialSuccess => "MS003",
        }
    }

    /// Exit code for a command line that clap refused.
    ///
    /// `--help` and `--version` also arrive as clap errors and exit cleanly.
    #[must_use]
    pub fn from_clap(err: &clap::Error) -> Self {
        if err.use_stderr() {
            Self::UsageError
        } else {
            Self::Success
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // All codes fit in a u8
        Self::from(code.as_i32() as u8)
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "MS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Messages of the underlying causes, outermost first
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
