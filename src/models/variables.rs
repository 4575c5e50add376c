//! The set of state variables known to exist on the aircraft.

use serde::Deserialize;
use std::collections::HashSet;

use crate::constants::{LOCAL_VARIABLE_SCOPE, VARIABLE_NAMESPACE};

/// Known variable identifiers (e.g. `MD11_OVHD_ELEC_BAT_BT`), read-only within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KnownVariableSet {
    #[serde(default)]
    variables: HashSet<String>,
}

impl KnownVariableSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the identifier is known.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    /// Number of known variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// True when no variables are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Looks up the namespaced variable for a control identifier.
    ///
    /// Returns the full reference (`L:MD11_<id>`) when `MD11_<id>` is known.
    #[must_use]
    pub fn reference_for(&self, id: &str) -> Option<String> {
        let name = format!("{VARIABLE_NAMESPACE}{id}");
        self.contains(&name)
            .then(|| format!("{LOCAL_VARIABLE_SCOPE}{name}"))
    }
}

impl<S: Into<String>> FromIterator<S> for KnownVariableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().map(Into::into).collect(),
        }
    }
}
