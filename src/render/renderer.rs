//! Entry rendering: one strategy per control kind.
//!
//! | kind                    | entries                                              |
//! |-------------------------|------------------------------------------------------|
//! | Increment               | one: get variable, set write-back                    |
//! | None, wheel             | wheel up, then wheel down, each a bare trigger       |
//! | Toggle                  | one: get variable, set conditional release/press     |
//! | SingleEvent             | one: get variable, set press trigger                 |
//! | None                    | press, release, right, guard, each a bare trigger    |
//!
//! Members without a gesture role always get one bare trigger entry each.

use std::collections::HashSet;

use serde_json::Value;

use super::comment::comment_for;
use super::expression;
use crate::metadata::MetadataContext;
use crate::models::entry::{READ_KEY, WRITE_KEY};
use crate::models::{ControlGroup, ControlKind, EntryKey, RenderedEntry};

/// Override keys that never become auxiliary keys.
const IGNORED_OVERRIDE_KEYS: [&str; 2] = ["event", "events"];

/// Renders groups in order and drops entries whose key was already emitted.
#[must_use]
pub fn render_groups(groups: &[ControlGroup], metadata: &MetadataContext) -> Vec<RenderedEntry> {
    let mut seen: HashSet<EntryKey> = HashSet::new();
    let mut entries = Vec::new();

    for group in groups {
        for entry in render_group(group, metadata) {
            if let Some(key) = entry.key() {
                if !seen.insert(key.clone()) {
                    tracing::debug!("Dropping duplicate entry '{key}' from {}", group.base);
                    continue;
                }
            }
            entries.push(entry);
        }
    }

    entries
}

/// Renders one correlated group.
#[must_use]
pub fn render_group(group: &ControlGroup, metadata: &MetadataContext) -> Vec<RenderedEntry> {
    let comment = group
        .first_member()
        .map_or_else(|| group.base.clone(), |first| comment_for(first, metadata));

    let mut entries = match (group.kind, group.correlated_variable.as_deref()) {
        (ControlKind::Increment, Some(reference)) => render_increment(group, &comment, reference),
        (ControlKind::Toggle, Some(reference)) => render_toggle(group, &comment, reference),
        (ControlKind::SingleEvent, Some(reference)) => {
            render_single_event(group, &comment, reference)
        }
        _ if group.is_wheel => render_wheel_triggers(group, &comment),
        _ => render_direct_triggers(group, &comment),
    };

    for member in group.members.iter().filter(|m| m.role.is_none()) {
        entries.push(trigger_entry(comment.clone(), &member.name));
    }

    for entry in &mut entries {
        apply_overrides(entry, group);
    }
    entries
}

fn render_increment(group: &ControlGroup, comment: &str, reference: &str) -> Vec<RenderedEntry> {
    let mut entry = RenderedEntry::new(comment);
    entry.get = Some(reference.to_string());
    entry.set = Some(expression::increment(reference));
    entry.events = [group.release(), group.press()]
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    vec![entry]
}

fn render_toggle(group: &ControlGroup, comment: &str, reference: &str) -> Vec<RenderedEntry> {
    let (Some(press), Some(release)) = (group.press(), group.release()) else {
        return render_direct_triggers(group, comment);
    };

    let mut entry = RenderedEntry::new(comment);
    entry.get = Some(reference.to_string());
    entry.set = Some(expression::toggle(press, release));
    entry.events = vec![press.to_string(), release.to_string()];

    let mut entries = vec![entry];
    entries.extend(secondary_and_guard(group, comment));
    entries
}

fn render_single_event(group: &ControlGroup, comment: &str, reference: &str) -> Vec<RenderedEntry> {
    let Some(press) = group.press() else {
        return render_direct_triggers(group, comment);
    };

    if let Some(release) = group.release() {
        tracing::debug!(
            "{release} not rendered: {} is a single-state control",
            group.base
        );
    }

    let mut entry = RenderedEntry::new(comment);
    entry.get = Some(reference.to_string());
    entry.set = Some(expression::trigger(press));
    entry.events = vec![press.to_string()];

    let mut entries = vec![entry];
    entries.extend(secondary_and_guard(group, comment));
    entries
}

fn render_wheel_triggers(group: &ControlGroup, comment: &str) -> Vec<RenderedEntry> {
    let mut entries = Vec::new();
    if let Some(up) = group.release() {
        entries.push(trigger_entry(format!("{comment} (Wheel Up)"), up));
    }
    if let Some(down) = group.press() {
        entries.push(trigger_entry(format!("{comment} (Wheel Down)"), down));
    }
    entries
}

fn render_direct_triggers(group: &ControlGroup, comment: &str) -> Vec<RenderedEntry> {
    let mut entries = Vec::new();
    let press = group.press();

    if let Some(press) = press {
        entries.push(trigger_entry(comment.to_string(), press));
    }
    if let Some(release) = group.release() {
        let label = if press.is_some() {
            format!("{comment} (Up)")
        } else {
            comment.to_string()
        };
        entries.push(trigger_entry(label, release));
    }
    entries.extend(secondary_and_guard(group, comment));
    entries
}

/// Right-button and guard triggers; they are never part of a synchronized pair.
fn secondary_and_guard(group: &ControlGroup, comment: &str) -> Vec<RenderedEntry> {
    let mut entries = Vec::new();
    if let Some(secondary) = group.secondary() {
        entries.push(trigger_entry(format!("{comment} (Right)"), secondary));
    }
    if let Some(guard) = group.guard() {
        entries.push(trigger_entry(format!("{comment} (Guard)"), guard));
    }
    entries
}

fn trigger_entry(comment: String, event: &str) -> RenderedEntry {
    let mut entry = RenderedEntry::new(comment);
    entry.set = Some(expression::trigger(event));
    entry.events = vec![event.to_string()];
    entry
}

/// Applies the group's overrides: `get`/`set` replace values, other keys become auxiliary.
fn apply_overrides(entry: &mut RenderedEntry, group: &ControlGroup) {
    for (key, value) in &group.overrides {
        if IGNORED_OVERRIDE_KEYS.contains(&key.as_str()) {
            continue;
        }
        let rendered = render_value(value);
        match key.as_str() {
            READ_KEY => entry.get = Some(rendered),
            WRITE_KEY => entry.set = Some(rendered),
            _ => {
                entry.aux.insert(key.clone(), rendered);
            }
        }
    }
}

/// Scalar text of an override value.
fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
