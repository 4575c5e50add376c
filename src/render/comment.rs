//! Descriptive comments for rendered entries.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::metadata::MetadataContext;

/// Gesture suffixes removed from an event name before a tooltip lookup.
const TOOLTIP_SUFFIXES: [&str; 12] = [
    "_LEFT_BUTTON_DOWN",
    "_LEFT_BUTTON_UP",
    "_RIGHT_BUTTON_DOWN",
    "_RIGHT_BUTTON_UP",
    "_WHEEL_UP",
    "_WHEEL_DOWN",
    "_PULL_DOWN",
    "_PULL_UP",
    "_PUSH_DOWN",
    "_PUSH_UP",
    "_GRD_LEFT_BUTTON_DOWN",
    "_GRD_LEFT_BUTTON_UP",
];

/// `<AREA>_<words>_<BT|SW|KB|GRD>_...`; the words become the comment.
static STRUCTURAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^_]+_(.+?)_(BT|SW|KB|GRD)_").unwrap());

/// Comment for an event.
///
/// Tries, in order: the tooltip of the event's control, the tooltip of the event
/// itself, the title-cased words between the area prefix and the control tag,
/// and finally the raw event name.
#[must_use]
pub fn comment_for(event: &str, metadata: &MetadataContext) -> String {
    let control_tooltip = TOOLTIP_SUFFIXES.iter().find_map(|suffix| {
        event
            .strip_suffix(suffix)
            .and_then(|base| metadata.tooltip(base))
    });
    if let Some(tooltip) = control_tooltip.or_else(|| metadata.tooltip(event)) {
        return tooltip.to_string();
    }

    STRUCTURAL_REGEX
        .captures(event)
        .and_then(|caps| caps.get(1))
        .map_or_else(
            || event.to_string(),
            |words| title_case(&words.as_str().replace('_', " ")),
        )
}

/// Uppercases the first letter of every run of letters and lowercases the rest.
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if previous_is_letter {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TemplateRecord;

    fn metadata_with(node: &str, tooltip: &str) -> MetadataContext {
        let mut metadata = MetadataContext::empty();
        metadata.extend([TemplateRecord {
            node_id: node.to_string(),
            tooltip: Some(tooltip.to_string()),
            ..TemplateRecord::default()
        }]);
        metadata
    }

    #[test]
    fn test_tooltip_of_control() {
        let metadata = metadata_with("OBS_AUDIO_PNL_VHF1_MIC_BT", "VHF 1 Mic");
        assert_eq!(
            comment_for("OBS_AUDIO_PNL_VHF1_MIC_BT_LEFT_BUTTON_DOWN", &metadata),
            "VHF 1 Mic"
        );
    }

    #[test]
    fn test_tooltip_of_event_itself() {
        let metadata = metadata_with("FMC_EXEC", "Execute");
        assert_eq!(comment_for("FMC_EXEC", &metadata), "Execute");
    }

    #[test]
    fn test_structural_fallback() {
        let metadata = MetadataContext::empty();
        assert_eq!(
            comment_for("OBS_AUDIO_PNL_VHF1_MIC_BT_LEFT_BUTTON_DOWN", &metadata),
            "Audio Pnl Vhf1 Mic"
        );
        assert_eq!(comment_for("PED_DU1_BRT_KB_WHEEL_UP", &metadata), "Du1 Brt");
    }

    #[test]
    fn test_raw_name_fallback() {
        assert_eq!(
            comment_for("COM1_RADIO_SET", &MetadataContext::empty()),
            "COM1_RADIO_SET"
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("VHF1 MIC"), "Vhf1 Mic");
        assert_eq!(title_case("1ST OFFICER"), "1St Officer");
    }
}
