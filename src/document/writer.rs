//! Document serialization and staged, atomic write-back.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::validator::validate_document;
use super::{PersistedDocument, INCLUDE_MARKER, SHARED_MARKER};
use crate::error::DefgenError;

/// Serializes a document.
///
/// Layout: header, blank, include section, blank, `shared:`, each block followed
/// by a blank line, closing comments, then the trailer. Always ends with exactly
/// one newline.
#[must_use]
pub fn serialize_document(document: &PersistedDocument) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !document.header.is_empty() {
        lines.extend(document.header.lines().map(str::to_string));
        lines.push(String::new());
    }

    if let Some(includes) = &document.includes {
        lines.push(INCLUDE_MARKER.to_string());
        lines.extend(includes.iter().map(|path| format!("  - {path}")));
        lines.push(String::new());
    }

    lines.push(SHARED_MARKER.to_string());
    for block in &document.blocks {
        lines.extend(block.leading.iter().cloned());
        lines.extend(block.lines.iter().cloned());
        lines.push(String::new());
    }
    if !document.closing.is_empty() {
        lines.extend(document.closing.iter().cloned());
        lines.push(String::new());
    }

    if let Some(trailer) = &document.trailer {
        lines.extend(trailer.lines().map(str::to_string));
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Performs an atomic file write using temp file + rename.
///
/// # Process
/// 1. Create the parent directory if needed
/// 2. Write to `<path>.tmp`
/// 3. Rename over the target path
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write to temporary file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}

/// A file staged for writing.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Destination
    pub path: PathBuf,
    /// Full content
    pub content: String,
}

/// Output of a run, held in memory until every document has validated.
#[derive(Debug, Clone, Default)]
pub struct StagedOutput {
    files: Vec<StagedFile>,
    deletions: Vec<PathBuf>,
}

/// What a commit did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Files written
    pub written: Vec<PathBuf>,
    /// Stale files removed
    pub deleted: Vec<PathBuf>,
}

impl StagedOutput {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes and validates a document, then stages it.
    ///
    /// # Errors
    ///
    /// Returns [`DefgenError::OutputValidation`] when the serialized document
    /// fails the structural check; nothing is staged in that case.
    pub fn stage_document(&mut self, path: &Path, document: &PersistedDocument) -> Result<()> {
        let content = serialize_document(document);
        let report = validate_document(&content);

        for warning in &report.warnings {
            tracing::warn!("{}: {warning}", path.display());
        }

        if !report.is_valid() {
            return Err(DefgenError::OutputValidation {
                path: path.to_path_buf(),
                report: report.format_message(),
            }
            .into());
        }

        self.stage_file(path, content);
        Ok(())
    }

    /// Stages arbitrary content (category data files).
    pub fn stage_file(&mut self, path: &Path, content: String) {
        self.files.push(StagedFile {
            path: path.to_path_buf(),
            content,
        });
    }

    /// Stages the removal of a stale file.
    pub fn stage_deletion(&mut self, path: &Path) {
        self.deletions.push(path.to_path_buf());
    }

    /// Staged files.
    #[must_use]
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Writes every staged file, then removes stale files that were not rewritten.
    pub fn commit(self) -> Result<CommitSummary> {
        let mut summary = CommitSummary::default();

        for file in &self.files {
            atomic_write(&file.path, &file.content)?;
            tracing::debug!("Wrote {}", file.path.display());
            summary.written.push(file.path.clone());
        }

        let written: HashSet<&PathBuf> = self.files.iter().map(|f| &f.path).collect();
        for path in &self.deletions {
            if written.contains(path) || !path.exists() {
                continue;
            }
            fs::remove_file(path)
                .with_context(|| format!("Failed to delete stale file: {}", path.display()))?;
            tracing::debug!("Deleted {}", path.display());
            summary.deleted.push(path.clone());
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::models::RenderedEntry;
    use tempfile::TempDir;

    fn entry(comment: &str, set: &str) -> RenderedEntry {
        let mut entry = RenderedEntry::new(comment);
        entry.set = Some(set.to_string());
        entry
    }

    #[test]
    fn test_serialize_bootstrap() {
        let doc = PersistedDocument::bootstrap();
        let text = serialize_document(&doc);
        assert!(text.starts_with("# TFDi Design MD-11 Configuration File for FS Copilot\n"));
        assert!(text.ends_with("\n\ninclude:\n\nshared:\n"));
    }

    #[test]
    fn test_serialize_module() {
        let doc = PersistedDocument::module("Pedestal", &[entry("Wx", "(>B:PED_WX)")]);
        let text = serialize_document(&doc);
        assert!(text.starts_with("# TFDI MD-11 Pedestal\n# Events reference:"));
        assert!(text.ends_with("\n\nshared:\n  - # Wx\n    set: (>B:PED_WX)\n"));
        assert!(!text.contains("include:"));
    }

    #[test]
    fn test_parse_serialize_is_stable() {
        let mut doc = PersistedDocument::bootstrap();
        doc.includes = Some(vec!["a.yaml".to_string()]);
        doc.blocks = vec![
            crate::document::Block::from_entry(&entry("A", "(>B:A)")),
            crate::document::Block {
                leading: vec!["  # note".to_string()],
                lines: vec!["  - get: L:X".to_string(), "    set: (>B:X)".to_string()],
            },
        ];
        doc.trailer = Some("master:\n  - get: A:Y".to_string());

        let text = serialize_document(&doc);
        let reparsed = parse_document(&text).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(serialize_document(&reparsed), text);
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/file.yaml");
        atomic_write(&path, "shared:\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "shared:\n");
        assert!(!temp_dir.path().join("nested/dir/file.yaml.tmp").exists());
    }

    #[test]
    fn test_stage_rejects_invalid_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.yaml");
        let mut doc = PersistedDocument::bootstrap();
        doc.blocks = vec![crate::document::Block {
            leading: vec![],
            lines: vec!["  - # Broken".to_string(), "    set: \"(>B:X)".to_string()],
        }];

        let mut stage = StagedOutput::new();
        let err = stage.stage_document(&path, &doc).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DefgenError>(),
            Some(DefgenError::OutputValidation { .. })
        ));
        assert!(stage.files().is_empty());
    }

    #[test]
    fn test_commit_writes_and_deletes() {
        let temp_dir = TempDir::new().unwrap();
        let keep = temp_dir.path().join("keep.yaml");
        let stale = temp_dir.path().join("stale.yaml");
        fs::write(&keep, "old").unwrap();
        fs::write(&stale, "old").unwrap();

        let mut stage = StagedOutput::new();
        stage
            .stage_document(&keep, &PersistedDocument::module("A", &[entry("A", "(>B:A)")]))
            .unwrap();
        stage.stage_deletion(&keep);
        stage.stage_deletion(&stale);
        let summary = stage.commit().unwrap();

        assert_eq!(summary.written, vec![keep.clone()]);
        assert_eq!(summary.deleted, vec![stale.clone()]);
        assert!(keep.exists());
        assert!(!stale.exists());
    }
}
