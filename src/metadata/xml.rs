//! Reading of `<UseTemplate>` control records from model behavior XML.
//!
//! Only the direct children the generator needs are kept:
//!
//! ```xml
//! <UseTemplate Name="TFDi_MD11_Switch_Template">
//!     <NODE_ID>MD11_OVHD_ELEC_BAT_SW</NODE_ID>
//!     <TOOLTIPID>Battery (%((L:MD11_OVHD_ELEC_BAT_SW))%{if}ON%{else}OFF%{end})</TOOLTIPID>
//!     <NUM_STATES>2</NUM_STATES>
//!     <LEFT_BUTTON_DOWN>...</LEFT_BUTTON_DOWN>
//! </UseTemplate>
//! ```

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::constants::VARIABLE_NAMESPACE;

static CLEAN_TOOLTIP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(.*?\).*$").unwrap());

const TEMPLATE_TAG: &[u8] = b"UseTemplate";

/// Child elements whose presence marks a gesture.
const GESTURE_TAGS: [(Gesture, [&[u8]; 2]); 5] = [
    (Gesture::LeftButton, [b"LEFT_BUTTON_DOWN", b"LEFT_BUTTON_UP"]),
    (Gesture::RightButton, [b"RIGHT_BUTTON_DOWN", b"RIGHT_BUTTON_UP"]),
    (Gesture::Wheel, [b"WHEEL_UP", b"WHEEL_DOWN"]),
    (Gesture::Pull, [b"PULL_UP", b"PULL_DOWN"]),
    (Gesture::Push, [b"PUSH_UP", b"PUSH_DOWN"]),
];

/// Physical gestures a control template can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Left mouse button
    LeftButton,
    /// Right mouse button
    RightButton,
    /// Scroll wheel
    Wheel,
    /// Pull
    Pull,
    /// Push
    Push,
}

impl Gesture {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        GESTURE_TAGS
            .iter()
            .find(|(_, tags)| tags.iter().any(|t| *t == tag))
            .map(|(gesture, _)| *gesture)
    }
}

/// One `<UseTemplate>` element with a `NODE_ID`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateRecord {
    /// Node id with the variable namespace removed
    pub node_id: String,
    /// Value of the `Name` attribute
    pub template_kind: String,
    /// Tooltip with dynamic parts removed
    pub tooltip: Option<String>,
    /// Declared number of states
    pub num_states: Option<u32>,
    /// Guard node id with the variable namespace removed
    pub guard_id: Option<String>,
    /// Gestures declared by direct child elements, in first-seen order
    pub gestures: Vec<Gesture>,
}

/// Direct children of a template that carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    NodeId,
    Tooltip,
    NumStates,
    GuardId,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"NODE_ID" => Some(Self::NodeId),
            b"TOOLTIPID" => Some(Self::Tooltip),
            b"NUM_STATES" => Some(Self::NumStates),
            b"GUARD_ID" => Some(Self::GuardId),
            _ => None,
        }
    }
}

/// A template being read, with the raw text of each field seen so far.
#[derive(Debug, Default)]
struct OpenTemplate {
    /// Element depth of the `<UseTemplate>` start tag
    depth: usize,
    template_kind: String,
    node_id: Option<String>,
    tooltip: Option<String>,
    num_states: Option<String>,
    guard_id: Option<String>,
    gestures: Vec<Gesture>,
    /// Field whose element is open, with its text so far
    field: Option<(Field, String)>,
}

impl OpenTemplate {
    fn open(depth: usize, start: &BytesStart<'_>) -> Result<Self> {
        let template_kind = match start.try_get_attribute("Name")? {
            Some(attr) => attr.unescape_value()?.into_owned(),
            None => String::new(),
        };
        Ok(Self {
            depth,
            template_kind,
            ..Self::default()
        })
    }

    /// Stores the text of a closed field; the first occurrence of a field wins.
    fn close_field(&mut self) {
        let Some((field, text)) = self.field.take() else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let slot = match field {
            Field::NodeId => &mut self.node_id,
            Field::Tooltip => &mut self.tooltip,
            Field::NumStates => &mut self.num_states,
            Field::GuardId => &mut self.guard_id,
        };
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    }

    fn finish(self) -> Option<TemplateRecord> {
        let node_id = self.node_id?;
        Some(TemplateRecord {
            node_id: strip_namespace(&node_id).to_string(),
            template_kind: self.template_kind,
            tooltip: self
                .tooltip
                .map(|raw| CLEAN_TOOLTIP_REGEX.replace(&raw, "").trim().to_string()),
            num_states: self.num_states.and_then(|text| text.parse().ok()),
            guard_id: self.guard_id.map(|id| strip_namespace(&id).to_string()),
            gestures: self.gestures,
        })
    }
}

/// Extracts all template records from one XML document.
///
/// Fails when the document is not well-formed: reader errors, unclosed
/// elements, no root element, or content after the root element.
pub fn scrape_templates(content: &str) -> Result<Vec<TemplateRecord>> {
    let mut reader = Reader::from_str(content);

    let mut records = Vec::new();
    let mut current: Option<OpenTemplate> = None;
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("XML parse error at byte {}", reader.buffer_position()))?;

        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                if depth == 0 {
                    if seen_root {
                        anyhow::bail!(
                            "Content after the root element at byte {}",
                            reader.buffer_position()
                        );
                    }
                    seen_root = true;
                }
                let is_empty = matches!(event, Event::Empty(_));
                let name = start.name();

                if let Some(template) = current.as_mut() {
                    if depth == template.depth + 1 {
                        if let Some(gesture) = Gesture::from_tag(name.as_ref()) {
                            if !template.gestures.contains(&gesture) {
                                template.gestures.push(gesture);
                            }
                        }
                        if !is_empty {
                            template.field =
                                Field::from_tag(name.as_ref()).map(|f| (f, String::new()));
                        }
                    }
                } else if name.as_ref() == TEMPLATE_TAG && !is_empty {
                    current = Some(OpenTemplate::open(depth, start)?);
                }

                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                match current.as_ref().map(|t| t.depth) {
                    Some(open) if depth == open + 1 => {
                        if let Some(template) = current.as_mut() {
                            template.close_field();
                        }
                    }
                    Some(open) if depth == open => {
                        if let Some(record) = current.take().and_then(OpenTemplate::finish) {
                            records.push(record);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if depth == 0 && !text.trim().is_empty() {
                    anyhow::bail!(
                        "Text outside the root element at byte {}",
                        reader.buffer_position()
                    );
                }
                if let Some((_, value)) = current.as_mut().and_then(|t| t.field.as_mut()) {
                    value.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some((_, value)) = current.as_mut().and_then(|t| t.field.as_mut()) {
                    value.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        anyhow::bail!("Document ends with {depth} unclosed element(s)");
    }
    if !seen_root {
        anyhow::bail!("Document has no root element");
    }

    Ok(records)
}

fn strip_namespace(id: &str) -> &str {
    id.strip_prefix(VARIABLE_NAMESPACE).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ModelInfo>
  <!-- overhead -->
  <UseTemplate Name="TFDi_MD11_Switch">
    <NODE_ID>MD11_OVHD_ELEC_BAT_SW</NODE_ID>
    <TOOLTIPID>Battery (%((L:MD11_OVHD_ELEC_BAT_SW))%{if}ON%{else}OFF%{end})</TOOLTIPID>
    <NUM_STATES>2</NUM_STATES>
    <GUARD_ID>MD11_OVHD_ELEC_BAT_GRD</GUARD_ID>
    <LEFT_BUTTON_DOWN>
      <NODE_ID>MD11_NESTED</NODE_ID>
    </LEFT_BUTTON_DOWN>
    <WHEEL_UP/>
  </UseTemplate>
  <UseTemplate Name="Empty"/>
  <UseTemplate Name="TFDi_MD11_Button">
    <NODE_ID>MD11_PED_WX_BT</NODE_ID>
    <TOOLTIPID>Weather &amp; Radar</TOOLTIPID>
    <NUM_STATES>one</NUM_STATES>
  </UseTemplate>
  <UseTemplate Name="NoNode">
    <TOOLTIPID>Ignored</TOOLTIPID>
  </UseTemplate>
</ModelInfo>"#;

    #[test]
    fn test_scrape_templates() {
        let records = scrape_templates(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        let bat = &records[0];
        assert_eq!(bat.node_id, "OVHD_ELEC_BAT_SW");
        assert_eq!(bat.template_kind, "TFDi_MD11_Switch");
        assert_eq!(bat.tooltip.as_deref(), Some("Battery"));
        assert_eq!(bat.num_states, Some(2));
        assert_eq!(bat.guard_id.as_deref(), Some("OVHD_ELEC_BAT_GRD"));
        assert_eq!(bat.gestures, vec![Gesture::LeftButton, Gesture::Wheel]);

        let wx = &records[1];
        assert_eq!(wx.node_id, "PED_WX_BT");
        assert_eq!(wx.tooltip.as_deref(), Some("Weather & Radar"));
        assert_eq!(wx.num_states, None);
        assert_eq!(wx.guard_id, None);
        assert!(wx.gestures.is_empty());
    }

    #[test]
    fn test_unclosed_root_is_rejected() {
        let truncated = "<ModelInfo><UseTemplate Name=\"T\"><NODE_ID>MD11_FOO_BT</NODE_ID>\
                         <NUM_STATES>1</NUM_STATES></UseTemplate>";
        assert!(scrape_templates(truncated).is_err());
    }

    #[test]
    fn test_mismatched_end_tag_is_rejected() {
        let broken = "<ModelInfo><UseTemplate><NODE_ID>MD11_A</NUM_STATES></UseTemplate></ModelInfo>";
        assert!(scrape_templates(broken).is_err());
    }

    #[test]
    fn test_non_xml_is_rejected() {
        assert!(scrape_templates("").is_err());
        assert!(scrape_templates("NODE_ID = MD11_A").is_err());
        assert!(scrape_templates("<A></A><B></B>").is_err());
    }
}
