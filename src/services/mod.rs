//! Service layer for business logic.
//!
//! This module contains the services that coordinate data loading, the event
//! pipeline, rendering and document write-back for each command.

pub mod categories;
pub mod coverage;
pub mod generation;

// Re-export commonly used types and functions
pub use categories::CategoryService;
pub use coverage::{CategoryCoverage, CoverageReport, CoverageService};
pub use generation::{
    CategoryOutcome, GenerateOptions, GenerationReport, GenerationService, ModuleOutcome,
    OutputLayout,
};
