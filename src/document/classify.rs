//! Manual vs. generated classification of existing entry blocks.
//!
//! | # | rule                                              | origin    |
//! |---|---------------------------------------------------|-----------|
//! | 1 | entry text contains `L:MD11_`                     | generated |
//! | 2 | `set` value contains a cockpit-area prefix        | generated |
//! | 3 | anything else                                     | manual    |
//!
//! The heuristic cannot recognize generated entries of a category whose events
//! carry none of the area prefixes below and which have no state variable.

use super::Block;
use crate::constants::{LOCAL_VARIABLE_SCOPE, VARIABLE_NAMESPACE};

/// Event prefixes of the cockpit areas the generator emits events for.
pub const AREA_PREFIXES: [&str; 18] = [
    "AOVHD_", "OVHD_", "PED_", "OBS_", "CTR_", "LSIDE_", "RSIDE_", "CGS_", "GSL_", "GSR_", "LECP_",
    "RECP_", "MIP_", "THR_", "YOKE_", "CMCDU_", "LMCDU_", "RMCDU_",
];

/// Who authored an entry block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrigin {
    /// Written by hand; preserved verbatim
    Manual,
    /// Written by a previous generation run; replaced
    Generated,
}

/// Classifies an existing block.
#[must_use]
pub fn classify_block(block: &Block) -> BlockOrigin {
    let namespaced_variable = format!("{LOCAL_VARIABLE_SCOPE}{VARIABLE_NAMESPACE}");
    if block.lines.iter().any(|line| line.contains(&namespaced_variable)) {
        return BlockOrigin::Generated;
    }

    let area_trigger = block
        .set_value()
        .is_some_and(|set| AREA_PREFIXES.iter().any(|prefix| set.contains(prefix)));
    if area_trigger {
        BlockOrigin::Generated
    } else {
        BlockOrigin::Manual
    }
}
