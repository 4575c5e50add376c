//! Optional control metadata scraped from the aircraft's XML behavior files.
//!
//! Metadata only raises output fidelity (single-state refinement and comment
//! text); generation works the same without it. The context is built once per
//! run and passed explicitly to the correlator and the renderer.

pub mod xml;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub use xml::{Gesture, TemplateRecord};

/// Metadata of one control, keyed by its base identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControlMetadata {
    /// Template name the control instantiates
    pub template_kind: String,
    /// Declared number of states
    pub num_states: Option<u32>,
    /// Base identifier of the control's guard
    pub guard_id: Option<String>,
    /// Gestures the template declares
    pub gestures: Vec<Gesture>,
}

/// Read-only metadata for one generation run.
#[derive(Debug, Clone, Default)]
pub struct MetadataContext {
    tooltips: HashMap<String, String>,
    controls: HashMap<String, ControlMetadata>,
}

impl MetadataContext {
    /// Creates an empty context.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads every `*.xml` file in a directory.
    ///
    /// A missing directory yields an empty context. Unreadable or malformed
    /// files are skipped. When two files describe the same node, the file that
    /// sorts first wins.
    pub fn load(xml_dir: &Path) -> Self {
        let mut context = Self::empty();

        let entries = match fs::read_dir(xml_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("No control metadata at {}: {e}", xml_dir.display());
                return context;
            }
        };

        let mut files: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
            })
            .collect();
        files.sort();

        for path in files {
            let records = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| xml::scrape_templates(&content));
            match records {
                Ok(records) => context.extend(records),
                Err(e) => tracing::debug!("Skipping metadata file {}: {e}", path.display()),
            }
        }

        tracing::debug!(
            "Loaded metadata for {} controls ({} tooltips)",
            context.controls.len(),
            context.tooltips.len()
        );
        context
    }

    /// Adds records, keeping existing entries on conflict.
    pub fn extend(&mut self, records: impl IntoIterator<Item = TemplateRecord>) {
        for record in records {
            if let Some(tooltip) = record.tooltip.filter(|t| !t.is_empty()) {
                self.tooltips
                    .entry(record.node_id.clone())
                    .or_insert(tooltip);
            }
            self.controls
                .entry(record.node_id)
                .or_insert(ControlMetadata {
                    template_kind: record.template_kind,
                    num_states: record.num_states,
                    guard_id: record.guard_id,
                    gestures: record.gestures,
                });
        }
    }

    /// Tooltip text for a base identifier.
    #[must_use]
    pub fn tooltip(&self, id: &str) -> Option<&str> {
        self.tooltips.get(id).map(String::as_str)
    }

    /// Metadata of a control.
    #[must_use]
    pub fn control(&self, base: &str) -> Option<&ControlMetadata> {
        self.controls.get(base)
    }

    /// True when the control is declared with exactly one state.
    #[must_use]
    pub fn is_single_state(&self, base: &str) -> bool {
        self.control(base).and_then(|c| c.num_states) == Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template(node: &str, tooltip: &str, states: u32) -> String {
        format!(
            "<UseTemplate Name=\"T\"><NODE_ID>MD11_{node}</NODE_ID>\
             <TOOLTIPID>{tooltip}</TOOLTIPID><NUM_STATES>{states}</NUM_STATES></UseTemplate>"
        )
    }

    fn model(templates: &[String]) -> String {
        format!("<ModelInfo>{}</ModelInfo>", templates.concat())
    }

    #[test]
    fn test_load_first_file_wins_and_bad_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("a.xml"),
            model(&[template("PED_WX_BT", "Weather", 1)]),
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("b.xml"),
            model(&[
                template("PED_WX_BT", "Other", 2),
                template("OVHD_BAT_SW", "Battery", 2),
            ]),
        )
        .unwrap();
        fs::write(temp_dir.path().join("c.xml"), "<UseTemplate Name=\"X\">").unwrap();
        fs::write(
            temp_dir.path().join("notes.txt"),
            model(&[template("IGNORED", "x", 1)]),
        )
        .unwrap();

        let context = MetadataContext::load(temp_dir.path());
        assert_eq!(context.tooltip("PED_WX_BT"), Some("Weather"));
        assert!(context.is_single_state("PED_WX_BT"));
        assert_eq!(context.tooltip("OVHD_BAT_SW"), Some("Battery"));
        assert!(!context.is_single_state("OVHD_BAT_SW"));
        assert!(context.control("IGNORED").is_none());
    }

    #[test]
    fn test_malformed_file_does_not_refine_controls() {
        let temp_dir = TempDir::new().unwrap();
        let unclosed = format!("<ModelInfo>{}", template("FOO_BT", "Foo", 1));
        fs::write(temp_dir.path().join("a.xml"), unclosed).unwrap();

        let context = MetadataContext::load(temp_dir.path());
        assert!(context.control("FOO_BT").is_none());
        assert!(!context.is_single_state("FOO_BT"));
        assert_eq!(context.tooltip("FOO_BT"), None);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let context = MetadataContext::load(&temp_dir.path().join("missing"));
        assert!(context.control("ANY").is_none());
        assert!(!context.is_single_state("ANY"));
    }
}
