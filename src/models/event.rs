//! Raw and normalized control events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::constants::PRESENT_MARKER;

/// Per-event override values, keyed by auxiliary key name.
pub type Overrides = BTreeMap<String, Value>;

/// One entry of a category's `events` array.
///
/// Category files list events either as bare identifiers or as records that
/// attach override keys to a single event:
///
/// ```json
/// "events": [
///   "OVHD_ELEC_BAT_BT_LEFT_BUTTON_DOWN // present",
///   { "event": "PED_RADAR_TILT_KB_WHEEL_UP", "skp": true }
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEvent {
    /// Bare identifier, possibly carrying the presence marker
    Plain(String),
    /// Identifier with overrides attached
    Overridden {
        /// Event identifier (may be missing in hand-edited files)
        #[serde(default)]
        event: String,
        /// Every other key of the record
        #[serde(flatten)]
        overrides: Overrides,
    },
}

impl RawEvent {
    /// Creates a bare event.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    /// Extracts the canonical name and overrides.
    ///
    /// Returns `None` when no identifier can be extracted; such entries are
    /// dropped by the pipeline.
    #[must_use]
    pub fn normalize(&self) -> Option<NormalizedEvent> {
        let (raw_name, overrides) = match self {
            Self::Plain(name) => (name.as_str(), Overrides::new()),
            Self::Overridden { event, overrides } => {
                let mut overrides = overrides.clone();
                overrides.remove("event");
                (event.as_str(), overrides)
            }
        };

        let name = strip_present_marker(raw_name);
        if name.is_empty() {
            None
        } else {
            Some(NormalizedEvent {
                name: name.to_string(),
                overrides,
            })
        }
    }

    /// Returns this event as it should be written back to the category file.
    ///
    /// Bare events get the presence marker when `present` is set; records are
    /// returned unchanged. Entries without an identifier yield `None`.
    #[must_use]
    pub fn with_presence(&self, present: bool) -> Option<Self> {
        let normalized = self.normalize()?;
        match self {
            Self::Plain(_) if present => Some(Self::Plain(format!(
                "{}{PRESENT_MARKER}",
                normalized.name
            ))),
            Self::Plain(_) => Some(Self::Plain(normalized.name)),
            Self::Overridden { .. } => Some(self.clone()),
        }
    }
}

/// Removes the presence marker and surrounding whitespace.
fn strip_present_marker(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(PRESENT_MARKER.trim_start())
        .map_or(trimmed, str::trim_end)
}

/// An event identifier with its overrides, as consumed by the grouper.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    /// Event identifier
    pub name: String,
    /// Override keys attached to this event (never contains `event`)
    pub overrides: Overrides,
}

impl NormalizedEvent {
    /// Creates an event without overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: Overrides::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_event_strips_marker() {
        let event = RawEvent::plain("  OVHD_BAT_BT_LEFT_BUTTON_DOWN // present ");
        let normalized = event.normalize().unwrap();
        assert_eq!(normalized.name, "OVHD_BAT_BT_LEFT_BUTTON_DOWN");
        assert!(normalized.overrides.is_empty());
    }

    #[test]
    fn test_record_event_keeps_overrides() {
        let event: RawEvent =
            serde_json::from_value(json!({"event": "PED_X_KB_WHEEL_UP", "skp": true, "delay": 5}))
                .unwrap();
        let normalized = event.normalize().unwrap();
        assert_eq!(normalized.name, "PED_X_KB_WHEEL_UP");
        assert_eq!(normalized.overrides.get("skp"), Some(&json!(true)));
        assert_eq!(normalized.overrides.get("delay"), Some(&json!(5)));
        assert!(!normalized.overrides.contains_key("event"));
    }

    #[test]
    fn test_missing_identifier_is_dropped() {
        assert!(RawEvent::plain("   ").normalize().is_none());
        assert!(RawEvent::plain(" // present").normalize().is_none());

        let record: RawEvent = serde_json::from_value(json!({"skp": true})).unwrap();
        assert!(record.normalize().is_none());
        assert!(record.with_presence(true).is_none());
    }

    #[test]
    fn test_with_presence() {
        let plain = RawEvent::plain("FOO // present");
        assert_eq!(
            plain.with_presence(false),
            Some(RawEvent::plain("FOO"))
        );
        assert_eq!(
            RawEvent::plain("FOO").with_presence(true),
            Some(RawEvent::plain("FOO // present"))
        );

        let record: RawEvent = serde_json::from_value(json!({"event": "BAR", "skp": 1})).unwrap();
        assert_eq!(record.with_presence(true), Some(record.clone()));
    }

    #[test]
    fn test_record_serializes_back_unchanged() {
        let value = json!({"event": "BAR", "skp": true});
        let record: RawEvent = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }
}
