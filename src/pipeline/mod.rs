//! Event pipeline: normalizer -> grouper -> correlator.
//!
//! Turns a flat list of raw events into correlated control groups ready for
//! rendering.

pub mod correlator;
pub mod grouper;
pub mod normalizer;
pub mod rules;

use crate::metadata::MetadataContext;
use crate::models::{ControlGroup, KnownVariableSet, RawEvent};

pub use correlator::{correlate, correlate_groups};
pub use grouper::group_events;
pub use normalizer::normalize_events;

/// Runs the whole pipeline over raw events.
#[must_use]
pub fn build_groups(
    raw: &[RawEvent],
    variables: &KnownVariableSet,
    metadata: &MetadataContext,
) -> Vec<ControlGroup> {
    let events = normalize_events(raw);
    let mut groups = group_events(&events);
    correlate_groups(&mut groups, variables, metadata);
    groups
}
