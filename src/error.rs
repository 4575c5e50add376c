//! Error taxonomy for generation runs.
//!
//! Library functions return `anyhow::Result`; the variants below travel inside the
//! `anyhow::Error` so the command layer can downcast them and pick an exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions recognized by the generator.
#[derive(Debug, Error)]
pub enum DefgenError {
    /// A category was named on the command line but has no data file.
    #[error("Unknown category '{name}'. Available categories: {available}")]
    UnknownCategory {
        /// Name given by the user
        name: String,
        /// Comma-separated list of known categories
        available: String,
    },

    /// A required input file does not exist.
    #[error("Required file not found: {}", path.display())]
    MissingResource {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// Category data or the variable set does not match its expected shape.
    #[error("Malformed input in {}: {message}", path.display())]
    MalformedInput {
        /// Offending file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A recomposed document failed the structural check; nothing was written.
    #[error("Generated document {} failed validation:\n{report}", path.display())]
    OutputValidation {
        /// Document that would have been written
        path: PathBuf,
        /// Formatted validation report
        report: String,
    },
}

impl DefgenError {
    /// Returns true for errors caused by bad data rather than the environment.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MalformedInput { .. } | Self::OutputValidation { .. })
    }

    /// Returns true for errors caused by how the command was invoked.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. })
    }
}
