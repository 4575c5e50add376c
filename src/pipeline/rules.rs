//! Ordered rule tables for grouping events into controls.
//!
//! Rules are tried top to bottom and the first matching rule wins, so the order
//! of each table decides tie-breaks between overlapping suffixes.

use crate::models::GestureRole;

/// How a rule derives the base identifier of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDerivation {
    /// Keep the name up to and including `tag`, where `tag` is directly followed
    /// by `_WHEEL_UP` or `_WHEEL_DOWN` and preceded by at least one character.
    WheelPrefix {
        /// Knob tag kept in the base (e.g. `_KB`)
        tag: &'static str,
        /// Base used when no such position exists
        fallback: WheelFallback,
    },
    /// Replace every occurrence of the matched marker with `with`.
    Replace {
        /// Replacement text
        with: &'static str,
    },
}

/// Fallback of a wheel rule whose marker is present but not in wheel-suffix form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelFallback {
    /// Text before the first marker occurrence, followed by the tag
    PrefixBeforeMarker,
    /// A fixed base
    Fixed(&'static str),
}

/// One grouping rule: applies when the event name contains `marker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingRule {
    /// Substring that selects this rule
    pub marker: &'static str,
    /// Base derivation
    pub derivation: BaseDerivation,
    /// True for knob-wheel rules
    pub is_wheel: bool,
}

/// Grouping rules in priority order.
///
/// | # | marker                   | base                         | wheel |
/// |---|--------------------------|------------------------------|-------|
/// | 1 | `_BRT_KB_WHEEL_`         | prefix through `_BRT_KB`     | yes   |
/// | 2 | `_KB_WHEEL_`             | prefix through `_KB`         | yes   |
/// | 3 | `_BT_LEFT_BUTTON_DOWN`   | marker -> `_BT`              | no    |
/// | 4 | `_BT_LEFT_BUTTON_UP`     | marker -> `_BT`              | no    |
/// | 5 | `_SW_LEFT_BUTTON_DOWN`   | marker -> `_SW`              | no    |
/// | 6 | `_SW_RIGHT_BUTTON_DOWN`  | marker -> `_SW`              | no    |
/// | 7 | `_GRD_LEFT_BUTTON_DOWN`  | marker -> `_GRD`             | no    |
///
/// Names matching no rule form a singleton group keyed by the name itself.
pub const GROUPING_RULES: [GroupingRule; 7] = [
    GroupingRule {
        marker: "_BRT_KB_WHEEL_",
        derivation: BaseDerivation::WheelPrefix {
            tag: "_BRT_KB",
            fallback: WheelFallback::PrefixBeforeMarker,
        },
        is_wheel: true,
    },
    GroupingRule {
        marker: "_KB_WHEEL_",
        derivation: BaseDerivation::WheelPrefix {
            tag: "_KB",
            fallback: WheelFallback::Fixed("WHEEL"),
        },
        is_wheel: true,
    },
    GroupingRule {
        marker: "_BT_LEFT_BUTTON_DOWN",
        derivation: BaseDerivation::Replace { with: "_BT" },
        is_wheel: false,
    },
    GroupingRule {
        marker: "_BT_LEFT_BUTTON_UP",
        derivation: BaseDerivation::Replace { with: "_BT" },
        is_wheel: false,
    },
    GroupingRule {
        marker: "_SW_LEFT_BUTTON_DOWN",
        derivation: BaseDerivation::Replace { with: "_SW" },
        is_wheel: false,
    },
    GroupingRule {
        marker: "_SW_RIGHT_BUTTON_DOWN",
        derivation: BaseDerivation::Replace { with: "_SW" },
        is_wheel: false,
    },
    GroupingRule {
        marker: "_GRD_LEFT_BUTTON_DOWN",
        derivation: BaseDerivation::Replace { with: "_GRD" },
        is_wheel: false,
    },
];

/// Gesture role table in priority order; applies to events matched by a grouping rule.
pub const ROLE_RULES: [(&str, GestureRole); 6] = [
    ("_WHEEL_DOWN", GestureRole::Press),
    ("_BT_LEFT_BUTTON_DOWN", GestureRole::Press),
    ("_SW_LEFT_BUTTON_DOWN", GestureRole::Press),
    ("_WHEEL_UP", GestureRole::Release),
    ("_BT_LEFT_BUTTON_UP", GestureRole::Release),
    ("_SW_RIGHT_BUTTON_DOWN", GestureRole::Secondary),
];

/// Guard role, checked after [`ROLE_RULES`].
pub const GUARD_ROLE_MARKER: &str = "_GRD_LEFT_BUTTON_DOWN";

/// Gesture suffixes stripped, in order, from a press event to find its control
/// variable. Each step removes at most one of its alternatives, and only at the
/// end of the name.
pub const VARIABLE_SUFFIX_STEPS: [&[&str]; 5] = [
    &["_LEFT_BUTTON_DOWN", "_LEFT_BUTTON_UP"],
    &["_RIGHT_BUTTON_DOWN", "_RIGHT_BUTTON_UP"],
    &["_GRD_LEFT_BUTTON_DOWN"],
    &["_KB_WHEEL_UP", "_KB_WHEEL_DOWN"],
    &["_WHEEL_UP", "_WHEEL_DOWN"],
];

/// Result of matching an event name against the grouping rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingMatch {
    /// Base identifier
    pub base: String,
    /// True for wheel groups
    pub is_wheel: bool,
    /// Slot the event fills
    pub role: Option<GestureRole>,
}

/// Matches an event name against [`GROUPING_RULES`].
///
/// Returns `None` when no rule applies (ungrouped singleton).
#[must_use]
pub fn match_grouping(name: &str) -> Option<GroupingMatch> {
    let rule = GROUPING_RULES.iter().find(|rule| name.contains(rule.marker))?;

    let base = match rule.derivation {
        BaseDerivation::WheelPrefix { tag, fallback } => wheel_prefix(name, tag)
            .unwrap_or_else(|| match fallback {
                WheelFallback::PrefixBeforeMarker => {
                    let prefix = name.split(rule.marker).next().unwrap_or_default();
                    format!("{prefix}{tag}")
                }
                WheelFallback::Fixed(base) => base.to_string(),
            }),
        BaseDerivation::Replace { with } => name.replace(rule.marker, with),
    };

    Some(GroupingMatch {
        base,
        is_wheel: rule.is_wheel,
        role: match_role(name),
    })
}

/// Gesture role of a grouped event name.
#[must_use]
pub fn match_role(name: &str) -> Option<GestureRole> {
    ROLE_RULES
        .iter()
        .find(|(marker, _)| name.contains(marker))
        .map(|(_, role)| *role)
        .or_else(|| name.contains(GUARD_ROLE_MARKER).then_some(GestureRole::Guard))
}

/// Shortest prefix (at least one character) ending in `tag` that is followed by
/// a wheel direction suffix.
fn wheel_prefix(name: &str, tag: &str) -> Option<String> {
    name.match_indices(tag)
        .filter(|(idx, _)| *idx > 0)
        .find(|(idx, _)| {
            let rest = &name[idx + tag.len()..];
            rest.starts_with("_WHEEL_UP") || rest.starts_with("_WHEEL_DOWN")
        })
        .map(|(idx, _)| name[..idx + tag.len()].to_string())
}

/// Strips the gesture suffixes of [`VARIABLE_SUFFIX_STEPS`] from an event name.
#[must_use]
pub fn strip_variable_suffixes(name: &str) -> &str {
    VARIABLE_SUFFIX_STEPS.iter().fold(name, |current, step| {
        step.iter()
            .find_map(|suffix| current.strip_suffix(suffix))
            .unwrap_or(current)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_of(name: &str) -> Option<(String, bool)> {
        match_grouping(name).map(|m| (m.base, m.is_wheel))
    }

    #[test]
    fn test_brightness_wheel_keeps_tag() {
        assert_eq!(
            base_of("PED_DU1_BRT_KB_WHEEL_UP"),
            Some(("PED_DU1_BRT_KB".to_string(), true))
        );
        assert_eq!(
            base_of("PED_DU1_BRT_KB_WHEEL_LEFT"),
            Some(("PED_DU1_BRT_KB".to_string(), true))
        );
    }

    #[test]
    fn test_knob_wheel() {
        assert_eq!(
            base_of("OBS_AUDIO_PNL_ADF1_VOL_KB_WHEEL_DOWN"),
            Some(("OBS_AUDIO_PNL_ADF1_VOL_KB".to_string(), true))
        );
        assert_eq!(
            match_grouping("VOL_KB_WHEEL_DOWN").and_then(|m| m.role),
            Some(GestureRole::Press)
        );
        assert_eq!(base_of("_KB_WHEEL_UP"), Some(("WHEEL".to_string(), true)));
    }

    #[test]
    fn test_button_switch_and_guard() {
        let press = match_grouping("LSIDE_TIMER_BT_LEFT_BUTTON_DOWN").unwrap();
        assert_eq!(press.base, "LSIDE_TIMER_BT");
        assert_eq!(press.role, Some(GestureRole::Press));

        let release = match_grouping("LSIDE_TIMER_BT_LEFT_BUTTON_UP").unwrap();
        assert_eq!(release.base, "LSIDE_TIMER_BT");
        assert_eq!(release.role, Some(GestureRole::Release));

        let right = match_grouping("LSIDE_TIMER_SW_RIGHT_BUTTON_DOWN").unwrap();
        assert_eq!(right.base, "LSIDE_TIMER_SW");
        assert_eq!(right.role, Some(GestureRole::Secondary));

        let guard = match_grouping("CTR_SLAT_STOW_GRD_LEFT_BUTTON_DOWN").unwrap();
        assert_eq!(guard.base, "CTR_SLAT_STOW_GRD");
        assert_eq!(guard.role, Some(GestureRole::Guard));
    }

    #[test]
    fn test_unmatched_name_is_singleton() {
        assert_eq!(match_grouping("COM1_RADIO_SET"), None);
        assert_eq!(match_grouping("FOO_SW_LEFT_BUTTON_UP"), None);
    }

    #[test]
    fn test_strip_variable_suffixes() {
        assert_eq!(
            strip_variable_suffixes("PED_CPT_RADIO_PNL_VHF1_BT_LEFT_BUTTON_DOWN"),
            "PED_CPT_RADIO_PNL_VHF1_BT"
        );
        assert_eq!(strip_variable_suffixes("X_SW_RIGHT_BUTTON_DOWN"), "X_SW");
        assert_eq!(strip_variable_suffixes("X_GRD_LEFT_BUTTON_DOWN"), "X_GRD");
        assert_eq!(strip_variable_suffixes("VOL_KB_WHEEL_UP"), "VOL");
        assert_eq!(strip_variable_suffixes("COM1_RADIO_SET"), "COM1_RADIO_SET");
    }
}
