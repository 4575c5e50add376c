//! Event normalization: raw category entries to `(name, overrides)` pairs.

use crate::models::{NormalizedEvent, RawEvent};

/// Normalizes raw events, dropping entries without an identifier.
#[must_use]
pub fn normalize_events(raw: &[RawEvent]) -> Vec<NormalizedEvent> {
    let events: Vec<NormalizedEvent> = raw.iter().filter_map(RawEvent::normalize).collect();

    let dropped = raw.len() - events.len();
    if dropped > 0 {
        tracing::debug!("Dropped {dropped} event entries without an identifier");
    }

    events
}
