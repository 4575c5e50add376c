//! Event grouping: partitions normalized events into control groups.
//!
//! The partition depends only on the set of events, not their order. Members
//! are kept in canonical order (role, then name) and overrides are merged in
//! that order, so shuffling the input yields identical groups.

use std::collections::BTreeMap;

use super::rules::match_grouping;
use crate::models::{ControlGroup, GroupMember, NormalizedEvent};

/// Groups events by base identifier; groups are returned sorted by base.
#[must_use]
pub fn group_events(events: &[NormalizedEvent]) -> Vec<ControlGroup> {
    let mut groups: BTreeMap<String, ControlGroup> = BTreeMap::new();

    for event in events {
        let (base, is_wheel, role) = match match_grouping(&event.name) {
            Some(m) => (m.base, m.is_wheel, m.role),
            None => (event.name.clone(), false, None),
        };

        let group = groups
            .entry(base)
            .or_insert_with_key(|base| ControlGroup::new(base.clone(), is_wheel));
        group.is_wheel |= is_wheel;

        if let Some(existing) = group.members.iter_mut().find(|m| m.name == event.name) {
            // Repeated event: merge its overrides into the single member
            existing
                .overrides
                .extend(event.overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        } else {
            group.members.push(GroupMember {
                name: event.name.clone(),
                role,
                overrides: event.overrides.clone(),
            });
        }
    }

    groups.into_values().map(canonicalize).collect()
}

/// Sorts members and merges their overrides; later members win on collision.
fn canonicalize(mut group: ControlGroup) -> ControlGroup {
    group.members.sort_by(|a, b| {
        // Members without a role sort last
        let rank = |m: &GroupMember| m.role.map_or((1, None), |r| (0, Some(r)));
        rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
    });

    group.overrides.clear();
    for member in &group.members {
        group
            .overrides
            .extend(member.overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GestureRole;
    use serde_json::json;

    fn events(names: &[&str]) -> Vec<NormalizedEvent> {
        names.iter().map(|n| NormalizedEvent::new(*n)).collect()
    }

    #[test]
    fn test_button_pair_forms_one_group() {
        let groups = group_events(&events(&[
            "FOO_BT_LEFT_BUTTON_UP",
            "FOO_BT_LEFT_BUTTON_DOWN",
        ]));
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.base, "FOO_BT");
        assert!(!group.is_wheel);
        assert_eq!(group.press(), Some("FOO_BT_LEFT_BUTTON_DOWN"));
        assert_eq!(group.release(), Some("FOO_BT_LEFT_BUTTON_UP"));
        assert_eq!(group.first_member(), Some("FOO_BT_LEFT_BUTTON_DOWN"));
    }

    #[test]
    fn test_switch_with_right_button_and_guard() {
        let groups = group_events(&events(&[
            "X_SW_RIGHT_BUTTON_DOWN",
            "X_SW_LEFT_BUTTON_DOWN",
            "X_GRD_LEFT_BUTTON_DOWN",
        ]));
        let bases: Vec<&str> = groups.iter().map(|g| g.base.as_str()).collect();
        assert_eq!(bases, vec!["X_GRD", "X_SW"]);
        assert_eq!(groups[0].guard(), Some("X_GRD_LEFT_BUTTON_DOWN"));
        assert_eq!(groups[1].secondary(), Some("X_SW_RIGHT_BUTTON_DOWN"));
        assert_eq!(groups[1].release(), None);
    }

    #[test]
    fn test_groups_sorted_by_base() {
        let groups = group_events(&events(&["ZED", "ALPHA", "MID_KB_WHEEL_UP"]));
        let bases: Vec<&str> = groups.iter().map(|g| g.base.as_str()).collect();
        assert_eq!(bases, vec!["ALPHA", "MID_KB", "ZED"]);
        assert!(groups[1].is_wheel);
        assert_eq!(groups[1].release(), Some("MID_KB_WHEEL_UP"));
    }

    #[test]
    fn test_overrides_merge_in_canonical_order() {
        let mut down = NormalizedEvent::new("FOO_BT_LEFT_BUTTON_DOWN");
        down.overrides.insert("skp".to_string(), json!(true));
        down.overrides.insert("delay".to_string(), json!(1));
        let mut up = NormalizedEvent::new("FOO_BT_LEFT_BUTTON_UP");
        up.overrides.insert("delay".to_string(), json!(2));

        for input in [vec![down.clone(), up.clone()], vec![up, down]] {
            let groups = group_events(&input);
            assert_eq!(groups[0].overrides.get("skp"), Some(&json!(true)));
            // Release sorts after press, so its value wins
            assert_eq!(groups[0].overrides.get("delay"), Some(&json!(2)));
        }
    }

    #[test]
    fn test_duplicate_events_collapse() {
        let groups = group_events(&events(&["A", "A"]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 1);
        assert_eq!(groups[0].members[0].role, None);
    }

    #[test]
    fn test_role_order() {
        let groups = group_events(&events(&[
            "Y_SW_RIGHT_BUTTON_DOWN",
            "Y_SW_LEFT_BUTTON_DOWN",
        ]));
        let roles: Vec<_> = groups[0].members.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Some(GestureRole::Press), Some(GestureRole::Secondary)]
        );
    }
}
