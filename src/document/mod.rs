//! FS Copilot definition documents: parsing, classification, merging,
//! validation and write-back.
//!
//! The engine only understands the narrow line grammar it writes itself:
//!
//! ```yaml
//! # header comment lines
//!
//! include:
//!   - modules/tfdi-md11/TFDi_MD11_pedestal.yaml
//!
//! shared:
//!   - # Battery
//!     get: L:MD11_OVHD_ELEC_BAT_BT
//!     set: "value ? '(>B:OVHD_ELEC_BAT_BT_LEFT_BUTTON_UP)' : '(>B:OVHD_ELEC_BAT_BT_LEFT_BUTTON_DOWN)'"
//!
//! master:
//!   ...
//! ```
//!
//! Everything after `master:` is passed through verbatim.

pub mod classify;
pub mod merge;
pub mod parser;
pub mod validator;
pub mod writer;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{DEFAULT_AIRCRAFT_HEADER, MODULE_HEADER_REFERENCES};
use crate::models::entry::{READ_KEY, WRITE_KEY};
use crate::models::{EntryKey, RenderedEntry};

pub use classify::{classify_block, BlockOrigin};
pub use parser::parse_document;
pub use validator::{validate_document, DocumentValidator, ValidationReport};
pub use writer::{atomic_write, serialize_document, StagedOutput};

/// Include-list marker.
pub const INCLUDE_MARKER: &str = "include:";
/// Entry region marker.
pub const SHARED_MARKER: &str = "shared:";
/// Trailer marker.
pub const MASTER_MARKER: &str = "master:";

/// `key: value` on a bullet or continuation line.
static KEY_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:-\s+)?([A-Za-z_][A-Za-z0-9_-]*)\s*:(?:\s+(.*))?$").unwrap());

/// One entry block of the shared region, captured verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Comment lines directly above the bullet
    pub leading: Vec<String>,
    /// Bullet line followed by its continuation lines
    pub lines: Vec<String>,
}

impl Block {
    /// Creates the block for a rendered entry.
    #[must_use]
    pub fn from_entry(entry: &RenderedEntry) -> Self {
        Self {
            leading: Vec::new(),
            lines: entry.to_lines(),
        }
    }

    /// Text of the entry lines, without leading comments.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Raw value of the first `key:` line of the entry.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let caps = KEY_LINE_REGEX.captures(line)?;
            (caps.get(1)?.as_str() == key)
                .then(|| caps.get(2).map_or("", |m| m.as_str().trim_end()))
        })
    }

    /// Read value.
    #[must_use]
    pub fn get_value(&self) -> Option<&str> {
        self.value_of(READ_KEY)
    }

    /// Write/trigger value.
    #[must_use]
    pub fn set_value(&self) -> Option<&str> {
        self.value_of(WRITE_KEY)
    }

    /// Identity key of the entry.
    #[must_use]
    pub fn key(&self) -> Option<EntryKey> {
        EntryKey::from_values(self.get_value(), self.set_value())
    }
}

/// A definition document split into its regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDocument {
    /// Opaque text before the first marker, without trailing blank lines
    pub header: String,
    /// Include paths; `None` for module documents, which have no include section
    pub includes: Option<Vec<String>>,
    /// Entry blocks of the shared region
    pub blocks: Vec<Block>,
    /// Comment lines after the last entry block, kept verbatim
    pub closing: Vec<String>,
    /// `master:` section and everything after it, verbatim
    pub trailer: Option<String>,
}

impl PersistedDocument {
    /// Empty aircraft document with the default header.
    #[must_use]
    pub fn bootstrap() -> Self {
        Self {
            header: DEFAULT_AIRCRAFT_HEADER.to_string(),
            includes: Some(Vec::new()),
            blocks: Vec::new(),
            closing: Vec::new(),
            trailer: None,
        }
    }

    /// Module document holding the given entries.
    #[must_use]
    pub fn module(description: &str, entries: &[RenderedEntry]) -> Self {
        Self {
            header: format!("# TFDI MD-11 {description}\n{MODULE_HEADER_REFERENCES}"),
            includes: None,
            blocks: entries.iter().map(Block::from_entry).collect(),
            closing: Vec::new(),
            trailer: None,
        }
    }

    /// Loads an aircraft document, bootstrapping when it is missing or unparseable.
    pub fn load_or_bootstrap(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("{} does not exist yet, starting a new document", path.display());
            return Ok(Self::bootstrap());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read definition file: {}", path.display()))?;

        match parse_document(&content) {
            Ok(mut document) => {
                if document.includes.is_none() {
                    document.includes = Some(Vec::new());
                }
                Ok(document)
            }
            Err(e) => {
                tracing::warn!(
                    "Could not parse {} ({e}); regenerating it from an empty document",
                    path.display()
                );
                Ok(Self::bootstrap())
            }
        }
    }

    /// Include paths, empty for module documents.
    #[must_use]
    pub fn include_paths(&self) -> &[String] {
        self.includes.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_block_values_and_key() {
        let block = Block {
            leading: vec![],
            lines: vec![
                "  - # Custom".to_string(),
                "    get: L:CUSTOM_VAR".to_string(),
                "    set: \"(>B:CUSTOM_EVENT)\"".to_string(),
            ],
        };
        assert_eq!(block.get_value(), Some("L:CUSTOM_VAR"));
        assert_eq!(block.set_value(), Some("\"(>B:CUSTOM_EVENT)\""));
        assert_eq!(block.key(), Some(EntryKey::Read("L:CUSTOM_VAR".to_string())));
    }

    #[test]
    fn test_inline_bullet_key() {
        let block = Block {
            leading: vec![],
            lines: vec!["  - set: (>K:COM1_RADIO_SWAP)".to_string()],
        };
        assert_eq!(
            block.key(),
            Some(EntryKey::Write("(>K:COM1_RADIO_SWAP)".to_string()))
        );
    }

    #[test]
    fn test_load_or_bootstrap() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.yaml");
        assert_eq!(
            PersistedDocument::load_or_bootstrap(&missing).unwrap(),
            PersistedDocument::bootstrap()
        );

        let garbage = temp_dir.path().join("garbage.yaml");
        fs::write(&garbage, "events:\n  - A\n").unwrap();
        assert_eq!(
            PersistedDocument::load_or_bootstrap(&garbage).unwrap(),
            PersistedDocument::bootstrap()
        );
    }
}
