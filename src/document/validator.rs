//! Structural validation of serialized definition documents.
//!
//! A document is checked twice: once line by line against the entry grammar the
//! engine writes, and once as plain YAML. Expressions are not evaluated.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

use std::collections::HashSet;

use super::parser::is_bullet;
use super::{parse_document, INCLUDE_MARKER, KEY_LINE_REGEX, MASTER_MARKER, SHARED_MARKER};
use crate::models::entry::{READ_KEY, WRITE_KEY};
use crate::models::EntryKey;

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Structural errors that block write-back
    pub errors: Vec<ValidationError>,
    /// Non-critical warnings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Formats the report as a user-friendly error message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("❌ {} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            message.push_str(&format!("\n⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation error with its line.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// 1-based line, when the error is tied to one
    pub line: Option<usize>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            message: message.into(),
        }
    }

    /// Sets the line context.
    #[must_use]
    pub const fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "[Line {line}] {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Types of structural errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No `shared:` marker
    MissingSection,
    /// Include list line that is not `  - <path>`
    InvalidInclude,
    /// Entry-region text outside any entry block
    OrphanContent,
    /// Continuation line not indented deeper than its bullet
    InvalidIndentation,
    /// Line that is not `key: value`
    InvalidKeyLine,
    /// Quoted value without its closing quote
    UnbalancedQuotes,
    /// Bullet with no keys
    EmptyEntry,
    /// Key repeated inside one entry
    DuplicateKey,
    /// Text is not loadable YAML
    YamlSyntax,
    /// Text cannot be parsed back into a document
    Unparseable,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSection => write!(f, "Missing section"),
            Self::InvalidInclude => write!(f, "Invalid include"),
            Self::OrphanContent => write!(f, "Content outside entry"),
            Self::InvalidIndentation => write!(f, "Invalid indentation"),
            Self::InvalidKeyLine => write!(f, "Invalid key line"),
            Self::UnbalancedQuotes => write!(f, "Unbalanced quotes"),
            Self::EmptyEntry => write!(f, "Empty entry"),
            Self::DuplicateKey => write!(f, "Duplicate key"),
            Self::YamlSyntax => write!(f, "YAML syntax"),
            Self::Unparseable => write!(f, "Unparseable document"),
        }
    }
}

/// Validation warning.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based line of the entry bullet
    pub line: Option<usize>,
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }

    /// Sets the line context.
    #[must_use]
    pub const fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "[Line {line}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Include,
    Shared,
    Master,
}

/// Entry block being scanned.
#[derive(Debug)]
struct OpenEntry {
    line: usize,
    indent: usize,
    keys: HashSet<String>,
    nested_under: Option<usize>,
    get: Option<String>,
    set: Option<String>,
}

impl OpenEntry {
    fn new(line: usize, indent: usize) -> Self {
        Self {
            line,
            indent,
            keys: HashSet::new(),
            nested_under: None,
            get: None,
            set: None,
        }
    }
}

/// Validates a serialized document.
pub struct DocumentValidator<'a> {
    content: &'a str,
    report: ValidationReport,
    seen_keys: HashSet<EntryKey>,
}

impl<'a> DocumentValidator<'a> {
    /// Creates a validator for the given text.
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            report: ValidationReport::new(),
            seen_keys: HashSet::new(),
        }
    }

    /// Runs every check and returns the report.
    #[must_use]
    pub fn validate(mut self) -> ValidationReport {
        self.scan_lines();
        self.check_yaml();
        self.check_reparse();
        self.report
    }

    fn error(&mut self, kind: ValidationErrorKind, line: usize, message: impl Into<String>) {
        self.report
            .add_error(ValidationError::new(kind, message).at_line(line));
    }

    fn scan_lines(&mut self) {
        let mut section = Section::Header;
        let mut entry: Option<OpenEntry> = None;

        for (idx, line) in self.content.lines().enumerate() {
            let line_num = idx + 1;
            let trimmed = line.trim();

            if line.trim_end() == INCLUDE_MARKER && section == Section::Header {
                section = Section::Include;
                continue;
            }
            if line.trim_end() == SHARED_MARKER
                && matches!(section, Section::Header | Section::Include)
            {
                section = Section::Shared;
                continue;
            }
            if line.trim_end() == MASTER_MARKER && section == Section::Shared {
                if let Some(open) = entry.take() {
                    self.close_entry(open);
                }
                section = Section::Master;
                continue;
            }

            let is_filler = trimmed.is_empty() || trimmed.starts_with('#');

            match section {
                // Header text is opaque; the YAML load covers it.
                Section::Header => {}
                Section::Include => {
                    let valid = is_filler
                        || (line.starts_with(char::is_whitespace)
                            && is_bullet(line)
                            && !trimmed[1..].trim().is_empty());
                    if !valid {
                        self.error(
                            ValidationErrorKind::InvalidInclude,
                            line_num,
                            format!("'{trimmed}'"),
                        );
                    }
                }
                Section::Shared => {
                    if is_filler {
                        continue;
                    }
                    if !line.starts_with(char::is_whitespace) {
                        self.error(
                            ValidationErrorKind::OrphanContent,
                            line_num,
                            format!("unexpected top-level line '{trimmed}'"),
                        );
                    } else if is_bullet(line) {
                        if let Some(open) = entry.take() {
                            self.close_entry(open);
                        }
                        entry = Some(self.open_entry(line, line_num));
                    } else if let Some(open) = entry.as_mut() {
                        let indent = indentation(line);
                        if indent <= open.indent {
                            self.error(
                                ValidationErrorKind::InvalidIndentation,
                                line_num,
                                format!("'{trimmed}' is not indented under its entry"),
                            );
                        } else if open.nested_under.is_some_and(|parent| indent > parent) {
                            // Nested value of a key with an empty inline value
                        } else {
                            self.scan_key_line(open, line, line_num);
                        }
                    } else {
                        self.error(
                            ValidationErrorKind::OrphanContent,
                            line_num,
                            format!("'{trimmed}' appears before the first entry"),
                        );
                    }
                }
                Section::Master => {}
            }
        }

        if let Some(open) = entry.take() {
            self.close_entry(open);
        }

        if matches!(section, Section::Header | Section::Include) {
            self.report.add_error(ValidationError::new(
                ValidationErrorKind::MissingSection,
                format!("no '{SHARED_MARKER}' section"),
            ));
        }
    }

    fn open_entry(&mut self, line: &str, line_num: usize) -> OpenEntry {
        let indent = indentation(line);
        let mut open = OpenEntry::new(line_num, indent);

        let rest = line.trim_start()[1..].trim();
        if !rest.is_empty() && !rest.starts_with('#') {
            self.scan_key_line(&mut open, line, line_num);
        }
        open
    }

    fn scan_key_line(&mut self, open: &mut OpenEntry, line: &str, line_num: usize) {
        let Some(caps) = KEY_LINE_REGEX.captures(line) else {
            self.error(
                ValidationErrorKind::InvalidKeyLine,
                line_num,
                format!("'{}' is not a key: value line", line.trim()),
            );
            return;
        };

        let key = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let value = caps.get(2).map_or("", |m| m.as_str().trim_end());

        if !open.keys.insert(key.clone()) {
            self.error(
                ValidationErrorKind::DuplicateKey,
                line_num,
                format!("'{key}' appears twice in the entry"),
            );
        }

        if !has_balanced_quotes(value) {
            self.error(
                ValidationErrorKind::UnbalancedQuotes,
                line_num,
                format!("value of '{key}' is missing its closing quote"),
            );
        }

        open.nested_under = value.is_empty().then(|| indentation(line));

        match key.as_str() {
            READ_KEY => open.get = Some(value.to_string()),
            WRITE_KEY => open.set = Some(value.to_string()),
            _ => {}
        }
    }

    fn close_entry(&mut self, open: OpenEntry) {
        if open.keys.is_empty() {
            self.error(
                ValidationErrorKind::EmptyEntry,
                open.line,
                "entry has no keys",
            );
            return;
        }

        match EntryKey::from_values(open.get.as_deref(), open.set.as_deref()) {
            Some(key) => {
                if !self.seen_keys.insert(key.clone()) {
                    self.report.add_warning(
                        ValidationWarning::new(format!("Duplicate entry for {key}"))
                            .at_line(open.line),
                    );
                }
            }
            None => self.report.add_warning(
                ValidationWarning::new(format!("Entry has neither '{READ_KEY}' nor '{WRITE_KEY}'"))
                    .at_line(open.line),
            ),
        }
    }

    fn check_yaml(&mut self) {
        if let Err(e) = serde_yml::from_str::<serde_yml::Value>(self.content) {
            self.report.add_error(ValidationError::new(
                ValidationErrorKind::YamlSyntax,
                e.to_string(),
            ));
        }
    }

    fn check_reparse(&mut self) {
        if let Err(e) = parse_document(self.content) {
            self.report.add_error(ValidationError::new(
                ValidationErrorKind::Unparseable,
                e.to_string(),
            ));
        }
    }
}

/// Validates a serialized document.
#[must_use]
pub fn validate_document(content: &str) -> ValidationReport {
    DocumentValidator::new(content).validate()
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Checks that a quoted scalar is closed, allowing a trailing comment after it.
fn has_balanced_quotes(value: &str) -> bool {
    let mut chars = value.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('"' | '\''))) => q,
        _ => return true,
    };

    let mut escaped = false;
    let mut close = None;
    let mut iter = chars.peekable();
    while let Some((idx, c)) = iter.next() {
        if quote == '"' {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                close = Some(idx);
                break;
            }
        } else if c == '\'' {
            // '' is an escaped single quote
            if iter.peek().is_some_and(|(_, next)| *next == '\'') {
                iter.next();
            } else {
                close = Some(idx);
                break;
            }
        }
    }

    close.is_some_and(|idx| {
        let rest = value[idx + 1..].trim();
        rest.is_empty() || rest.starts_with('#')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "# Header

include:
  - standard/common.yaml

shared:
  - # Battery
    get: L:MD11_OVHD_BAT_BT
    set: \"value ? '(>B:OVHD_BAT_BT_LEFT_BUTTON_UP)' : '(>B:OVHD_BAT_BT_LEFT_BUTTON_DOWN)'\"

  # Custom
  - get: L:CUSTOM_VAR
    set: (>K:COM1_RADIO_SWAP)
    skp: true

  - # Speed knob
    get: L:MD11_GSL_SPD_KB
    set: \"`${value} (>L:MD11_GSL_SPD_KB)`\"

master:
  - get: A:LIGHT NAV
";

    #[test]
    fn test_valid_document() {
        let report = validate_document(VALID);
        assert!(report.is_valid(), "{}", report.format_message());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_header_keys_pass_through() {
        let content = "# TFDi\nname: MD-11\n\ninclude:\n  - a.yaml\n\nshared:\n  - set: (>K:COM1_RADIO_SWAP)\n";
        let report = validate_document(content);
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_unbalanced_quotes() {
        let report = validate_document("shared:\n  - # A\n    set: \"(>B:A)\n");
        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnbalancedQuotes && e.line == Some(3)));
    }

    #[test]
    fn test_missing_shared_section() {
        let report = validate_document("# only\ninclude:\n  - a.yaml\n");
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingSection));
    }

    #[test]
    fn test_orphan_and_indentation_errors() {
        let report = validate_document("shared:\n    set: (>B:A)\n  - # A\n  set: (>B:B)\n");
        let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::OrphanContent));
        assert!(kinds.contains(&ValidationErrorKind::InvalidIndentation));
    }

    #[test]
    fn test_top_level_line_in_entry_region() {
        let report = validate_document("shared:\n  - set: (>B:A)\nevents:\n  - set: (>B:B)\n");
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::OrphanContent && e.line == Some(3)));
    }

    #[test]
    fn test_empty_entry_and_duplicate_key() {
        let report = validate_document(
            "shared:\n  - # Nothing\n\n  - set: (>B:A)\n    set: (>B:B)\n",
        );
        let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::EmptyEntry));
        assert!(kinds.contains(&ValidationErrorKind::DuplicateKey));
    }

    #[test]
    fn test_nested_value_is_accepted() {
        let report = validate_document(
            "shared:\n  - get: L:X\n    set: (>B:X)\n    condition:\n      var: A:ALT\n",
        );
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_warnings_do_not_block() {
        let report = validate_document(
            "shared:\n  - set: (>B:A)\n\n  - set: \"(>B:A)\"\n\n  - skp: true\n",
        );
        assert!(report.is_valid(), "{}", report.format_message());
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].line, Some(4));
    }

    #[test]
    fn test_invalid_include_line() {
        let report = validate_document("include:\n  a.yaml\nshared:\n");
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidInclude));
    }

    #[test]
    fn test_has_balanced_quotes() {
        assert!(has_balanced_quotes("(>B:A)"));
        assert!(has_balanced_quotes("\"a 'b' c\""));
        assert!(has_balanced_quotes("'it''s'"));
        assert!(has_balanced_quotes("\"x\" # note"));
        assert!(!has_balanced_quotes("\"x"));
        assert!(!has_balanced_quotes("'x"));
        assert!(!has_balanced_quotes("\"x\" y"));
    }

    #[test]
    fn test_format_message() {
        let mut report = ValidationReport::new();
        report.add_error(ValidationError::new(ValidationErrorKind::EmptyEntry, "Test error").at_line(3));
        report.add_warning(ValidationWarning::new("Test warning"));
        let message = report.format_message();
        assert!(message.contains("1 validation errors"));
        assert!(message.contains("[Line 3] Empty entry: Test error"));
        assert!(message.contains("1 warnings"));
    }
}
