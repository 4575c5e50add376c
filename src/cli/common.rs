//! Shared CLI error type and exit codes.

use std::fmt;

use crate::error::DefgenError;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Malformed input or a generated document failed validation
    Validation = 1,
    /// I/O failure or missing resource
    Io = 2,
    /// Bad invocation (unknown category, bad flags)
    Usage = 3,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// What kind of failure a command hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    /// Validation failure
    Validation,
    /// I/O failure
    Io,
    /// Usage error
    Usage,
}

/// Error returned by command handlers.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Failure kind, decides the exit code
    pub kind: CliErrorKind,
    /// Message printed to stderr
    pub message: String,
}

/// Result type of command handlers.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Validation error (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Validation,
            message: message.into(),
        }
    }

    /// I/O error (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Io,
            message: message.into(),
        }
    }

    /// Usage error (exit code 3).
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Usage,
            message: message.into(),
        }
    }

    /// Classifies a library error by the [`DefgenError`] it carries.
    ///
    /// Errors without one fall back to `fallback`.
    pub fn from_anyhow(error: &anyhow::Error, fallback: CliErrorKind) -> Self {
        let kind = match error.downcast_ref::<DefgenError>() {
            Some(e) if e.is_usage() => CliErrorKind::Usage,
            Some(e) if e.is_validation() => CliErrorKind::Validation,
            Some(DefgenError::MissingResource { .. }) => CliErrorKind::Io,
            _ => fallback,
        };

        Self {
            kind,
            message: format!("{error:#}"),
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.kind {
            CliErrorKind::Validation => ExitCode::Validation,
            CliErrorKind::Io => ExitCode::Io,
            CliErrorKind::Usage => ExitCode::Usage,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}
