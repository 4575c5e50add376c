//! CLI command handlers for defgen.
//!
//! Each subcommand is an `Args` struct whose `execute` method maps library
//! errors onto [`CliError`] and its exit code.

pub mod check;
pub mod common;
pub mod generate;

// Re-export types used by main.rs and tests
pub use check::CheckArgs;
pub use common::{CliError, CliErrorKind, CliResult, ExitCode};
pub use generate::GenerateArgs;
