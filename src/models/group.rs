//! Control groups: the raw events belonging to one physical control.

use std::fmt;

use super::event::Overrides;

/// Gesture role of an event within its control group.
///
/// The declaration order is the canonical member order inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GestureRole {
    /// Left-button down on a button or switch, or wheel down
    Press,
    /// Left-button up on a button, or wheel up
    Release,
    /// Right-button down on a switch
    Secondary,
    /// Left-button down on a guard
    Guard,
}

/// How a group is rendered, decided by the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlKind {
    /// Direct triggers, no state variable
    #[default]
    None,
    /// Press/release pair synchronized through a boolean variable
    Toggle,
    /// Wheel synchronized by writing the variable back
    Increment,
    /// Toggle whose control has a single state; only the press is triggered
    SingleEvent,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Toggle => write!(f, "Toggle"),
            Self::Increment => write!(f, "Increment"),
            Self::SingleEvent => write!(f, "SingleEvent"),
        }
    }
}

/// A member event of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    /// Event identifier
    pub name: String,
    /// Slot this event fills, if any
    pub role: Option<GestureRole>,
    /// Overrides attached to this event
    pub overrides: Overrides,
}

/// The set of raw events for one physical control, unified by a base identifier.
///
/// Invariant: an event name belongs to exactly one group, and appears at most
/// once in its member list.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGroup {
    /// Base identifier derived from the member names
    pub base: String,
    /// Members in canonical order (role, then name)
    pub members: Vec<GroupMember>,
    /// True for knob wheels
    pub is_wheel: bool,
    /// Overrides of all members, later members winning on key collision
    pub overrides: Overrides,
    /// Variable reference (e.g. `L:MD11_FOO_BT`) set by the correlator
    pub correlated_variable: Option<String>,
    /// Rendering strategy set by the correlator
    pub kind: ControlKind,
}

impl ControlGroup {
    /// Creates an empty group.
    pub fn new(base: impl Into<String>, is_wheel: bool) -> Self {
        Self {
            base: base.into(),
            members: Vec::new(),
            is_wheel,
            overrides: Overrides::new(),
            correlated_variable: None,
            kind: ControlKind::None,
        }
    }

    /// Returns the event filling the given slot.
    #[must_use]
    pub fn slot(&self, role: GestureRole) -> Option<&str> {
        self.members
            .iter()
            .rev()
            .find(|m| m.role == Some(role))
            .map(|m| m.name.as_str())
    }

    /// Press (or wheel down) event.
    #[must_use]
    pub fn press(&self) -> Option<&str> {
        self.slot(GestureRole::Press)
    }

    /// Release (or wheel up) event.
    #[must_use]
    pub fn release(&self) -> Option<&str> {
        self.slot(GestureRole::Release)
    }

    /// Right-button event.
    #[must_use]
    pub fn secondary(&self) -> Option<&str> {
        self.slot(GestureRole::Secondary)
    }

    /// Guard event.
    #[must_use]
    pub fn guard(&self) -> Option<&str> {
        self.slot(GestureRole::Guard)
    }

    /// True when no member fills any slot.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.iter().all(|m| m.role.is_none())
    }

    /// First member, used to derive the descriptive comment.
    #[must_use]
    pub fn first_member(&self) -> Option<&str> {
        self.members.first().map(|m| m.name.as_str())
    }
}
