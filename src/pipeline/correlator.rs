//! Variable correlation: decides each group's control kind.
//!
//! | group                                   | variable looked up          | kind        |
//! |-----------------------------------------|-----------------------------|-------------|
//! | wheel, both directions                  | `MD11_<base>`               | Increment   |
//! | non-wheel, press and release            | `MD11_<press minus suffix>` | Toggle      |
//! | as above, metadata says one state       | same                        | SingleEvent |
//! | anything else, or variable unknown      | -                           | None        |

use super::rules::strip_variable_suffixes;
use crate::metadata::MetadataContext;
use crate::models::{ControlGroup, ControlKind, KnownVariableSet};

/// Sets `correlated_variable` and `kind` on every group.
pub fn correlate_groups(
    groups: &mut [ControlGroup],
    variables: &KnownVariableSet,
    metadata: &MetadataContext,
) {
    for group in groups {
        correlate(group, variables, metadata);
    }
}

/// Correlates one group and returns its kind.
pub fn correlate(
    group: &mut ControlGroup,
    variables: &KnownVariableSet,
    metadata: &MetadataContext,
) -> ControlKind {
    group.correlated_variable = None;
    group.kind = ControlKind::None;

    let (Some(press), Some(_)) = (group.press(), group.release()) else {
        return group.kind;
    };

    if group.is_wheel {
        if let Some(reference) = variables.reference_for(&group.base) {
            group.correlated_variable = Some(reference);
            group.kind = ControlKind::Increment;
        }
    } else if let Some(reference) = variables.reference_for(strip_variable_suffixes(press)) {
        group.correlated_variable = Some(reference);
        group.kind = if metadata.is_single_state(&group.base) {
            ControlKind::SingleEvent
        } else {
            ControlKind::Toggle
        };
    }

    if group.kind != ControlKind::None {
        tracing::debug!("{} correlated as {}", group.base, group.kind);
    }
    group.kind
}
