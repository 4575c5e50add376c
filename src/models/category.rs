//! Category data: the raw events of one cockpit panel or system.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::event::{NormalizedEvent, RawEvent};

/// Contents of a `<category>.json` data file.
///
/// `present_count` and `total_count` are bookkeeping outputs rewritten on every
/// generation run; unknown fields are carried through untouched, and fields keep
/// the order they had in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    /// Category name as stored in the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw events, bare or with overrides
    #[serde(default)]
    pub events: Vec<RawEvent>,
    /// Number of events present in a definition document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present_count: Option<usize>,
    /// Number of events with an identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    /// Fields this tool does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Top-level keys in file order
    #[serde(skip)]
    pub key_order: Vec<String>,
}

impl CategoryData {
    /// Creates category data from bare event names.
    pub fn new(category: impl Into<String>, events: &[&str]) -> Self {
        Self {
            category: Some(category.into()),
            description: None,
            events: events.iter().map(|e| RawEvent::plain(*e)).collect(),
            present_count: None,
            total_count: None,
            extra: serde_json::Map::new(),
            key_order: Vec::new(),
        }
    }

    /// Parses a category file, remembering the order of its top-level keys.
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let key_order = value
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();
        let mut data: Self = serde_json::from_value(value)?;
        data.key_order = key_order;
        Ok(data)
    }

    /// Normalized events; entries without an identifier are skipped.
    #[must_use]
    pub fn normalized_events(&self) -> Vec<NormalizedEvent> {
        self.events.iter().filter_map(RawEvent::normalize).collect()
    }

    /// Rewrites presence markers and counts from the set of present event names.
    ///
    /// Returns the number of events marked present.
    pub fn apply_presence(&mut self, present: &HashSet<String>) -> usize {
        let mut present_count = 0;
        let events: Vec<RawEvent> = self
            .events
            .iter()
            .filter_map(|raw| {
                let name = raw.normalize()?.name;
                let is_present = present.contains(&name);
                if is_present {
                    present_count += 1;
                }
                raw.with_presence(is_present)
            })
            .collect();

        self.total_count = Some(events.len());
        self.present_count = Some(present_count);
        self.events = events;
        present_count
    }

    /// Serializes as pretty JSON with a trailing newline.
    ///
    /// Keys read from the file come first in their original order; keys the
    /// file did not have follow.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let value = match serde_json::to_value(self)? {
            serde_json::Value::Object(fields) => {
                let mut ordered = serde_json::Map::new();
                for key in &self.key_order {
                    if let Some(field) = fields.get(key) {
                        ordered.insert(key.clone(), field.clone());
                    }
                }
                for (key, field) in fields {
                    if !ordered.contains_key(&key) {
                        ordered.insert(key, field);
                    }
                }
                serde_json::Value::Object(ordered)
            }
            other => other,
        };

        let mut json = serde_json::to_string_pretty(&value)?;
        json.push('\n');
        Ok(json)
    }
}

/// A category as found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Category name (the file stem)
    pub name: String,
    /// Path of the data file
    pub path: std::path::PathBuf,
}

/// Title-cases a snake_case name, e.g. `overhead_panel` -> `Overhead Panel`.
#[must_use]
pub fn title_case_name(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_presence() {
        let mut data: CategoryData = serde_json::from_value(json!({
            "category": "pedestal",
            "events": [
                "A_BT_LEFT_BUTTON_DOWN",
                "B // present",
                {"event": "C", "skp": true},
                {"skp": false},
                ""
            ],
            "present_count": 99,
            "source": "sdk"
        }))
        .unwrap();

        let present: HashSet<String> = ["A_BT_LEFT_BUTTON_DOWN", "C"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        assert_eq!(data.apply_presence(&present), 2);

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value["events"],
            json!(["A_BT_LEFT_BUTTON_DOWN // present", "B", {"event": "C", "skp": true}])
        );
        assert_eq!(value["present_count"], json!(2));
        assert_eq!(value["total_count"], json!(3));
        assert_eq!(value["source"], json!("sdk"));
    }

    #[test]
    fn test_to_json_string_ends_with_newline() {
        let data = CategoryData::new("pedestal", &["A"]);
        let json = data.to_json_string().unwrap();
        assert!(json.ends_with("}\n"));
        assert!(json.contains("  \"category\": \"pedestal\""));
    }

    #[test]
    fn test_write_back_keeps_fields_and_order() {
        let mut data = CategoryData::from_json_str(
            r#"{"source": "sdk", "events": ["A", "B"], "description": "Pedestal", "present_count": 0}"#,
        )
        .unwrap();
        let present: HashSet<String> = std::iter::once("A".to_string()).collect();
        data.apply_presence(&present);

        let json = data.to_json_string().unwrap();
        assert!(!json.contains("\"category\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["source", "events", "description", "present_count", "total_count"]
        );
        assert_eq!(value["events"], json!(["A // present", "B"]));
    }

    #[test]
    fn test_title_case_name() {
        assert_eq!(title_case_name("overhead_panel"), "Overhead Panel");
        assert_eq!(title_case_name("fmc_cdu"), "Fmc Cdu");
        assert_eq!(title_case_name("Flight_Controls"), "Flight Controls");
    }
}
