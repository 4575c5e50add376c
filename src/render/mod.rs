//! Rendering of correlated control groups into definition entries.

pub mod comment;
pub mod expression;
pub mod renderer;

pub use comment::comment_for;
pub use renderer::{render_group, render_groups};
