//! Rendered definition entries and their identity keys.

use std::collections::BTreeMap;
use std::fmt;

/// Read key of a definition entry.
pub const READ_KEY: &str = "get";
/// Write/trigger key of a definition entry.
pub const WRITE_KEY: &str = "set";
/// Auxiliary key ordered directly after the write key.
pub const SKIP_KEY: &str = "skp";

/// One definition entry produced by the renderer.
///
/// Serialized as:
///
/// ```yaml
///   - # Battery
///     get: L:MD11_OVHD_ELEC_BAT_BT
///     set: "value ? '(>B:OVHD_ELEC_BAT_BT_LEFT_BUTTON_UP)' : '(>B:OVHD_ELEC_BAT_BT_LEFT_BUTTON_DOWN)'"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    /// Human-readable comment on the bullet line
    pub comment: String,
    /// Read value (variable reference)
    pub get: Option<String>,
    /// Write/trigger expression
    pub set: Option<String>,
    /// Auxiliary keys and their rendered values
    pub aux: BTreeMap<String, String>,
    /// Source events this entry accounts for
    pub events: Vec<String>,
}

impl RenderedEntry {
    /// Creates an entry with only a comment.
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            get: None,
            set: None,
            aux: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Identity key: the read value if present, else the write value.
    #[must_use]
    pub fn key(&self) -> Option<EntryKey> {
        EntryKey::from_values(self.get.as_deref(), self.set.as_deref())
    }

    /// Auxiliary keys in output order: `skp` first, then alphabetical.
    pub fn ordered_aux(&self) -> impl Iterator<Item = (&String, &String)> {
        let skip = self.aux.get_key_value(SKIP_KEY);
        skip.into_iter()
            .chain(self.aux.iter().filter(|(k, _)| k.as_str() != SKIP_KEY))
    }

    /// Text lines of this entry, without a trailing blank line.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3 + self.aux.len());
        if self.comment.is_empty() {
            lines.push("  -".to_string());
        } else {
            lines.push(format!("  - # {}", self.comment));
        }
        if let Some(get) = &self.get {
            lines.push(format!("    {READ_KEY}: {get}"));
        }
        if let Some(set) = &self.set {
            lines.push(format!("    {WRITE_KEY}: {set}"));
        }
        for (key, value) in self.ordered_aux() {
            lines.push(format!("    {key}: {value}"));
        }
        lines
    }
}

/// Identity of an entry, used for dedup and for replacing stale entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKey {
    /// Keyed by the read value
    Read(String),
    /// Keyed by the write value (entry has no read key)
    Write(String),
}

impl EntryKey {
    /// Builds a key from raw `get`/`set` values.
    ///
    /// Values are compared as unquoted scalars so `"(>B:X)"` and `(>B:X)` match.
    #[must_use]
    pub fn from_values(get: Option<&str>, set: Option<&str>) -> Option<Self> {
        let get = get.map(normalize_scalar).filter(|v| !v.is_empty());
        let set = set.map(normalize_scalar).filter(|v| !v.is_empty());
        match (get, set) {
            (Some(read), _) => Some(Self::Read(read)),
            (None, Some(write)) => Some(Self::Write(write)),
            (None, None) => None,
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(value) => write!(f, "{READ_KEY}: {value}"),
            Self::Write(value) => write!(f, "{WRITE_KEY}: {value}"),
        }
    }
}

/// Strips an inline comment and one level of matching quotes from a scalar.
#[must_use]
pub fn normalize_scalar(value: &str) -> String {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    // Unquoted plain scalars end at " #"
    value
        .find(" #")
        .map_or(value, |idx| value[..idx].trim_end())
        .to_string()
}
