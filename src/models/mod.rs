//! Data models for control events, groups, rendered entries and category data.
//!
//! Models are independent of the pipeline and of the document format; the
//! pipeline and renderer operate on them.

pub mod category;
pub mod entry;
pub mod event;
pub mod group;
pub mod variables;

// Re-export all model types
pub use category::{title_case_name, CategoryData, CategoryInfo};
pub use entry::{EntryKey, RenderedEntry};
pub use event::{NormalizedEvent, Overrides, RawEvent};
pub use group::{ControlGroup, ControlKind, GestureRole, GroupMember};
pub use variables::KnownVariableSet;
