//! defgen library
//!
//! Turns TFDi MD-11 control-event category data into FS Copilot definition
//! documents: events are grouped into physical controls, correlated with the
//! aircraft's state variables, rendered as definition entries, and merged into
//! existing documents without disturbing hand-written entries.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod services;

pub use error::DefgenError;
