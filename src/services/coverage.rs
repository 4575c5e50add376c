//! Coverage check: which category events already appear in definition documents.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::categories::CategoryService;
use super::generation::module_documents;
use crate::config::Config;
use crate::constants::VARIABLE_NAMESPACE;
use crate::document::StagedOutput;
use crate::error::DefgenError;

/// Coverage of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCoverage {
    /// Category name
    pub name: String,
    /// Events found in a document
    pub present: usize,
    /// Events with an identifier
    pub total: usize,
    /// Events found nowhere
    pub missing: Vec<String>,
}

impl CategoryCoverage {
    /// Present events as a percentage of all events.
    #[must_use]
    pub fn percent(&self) -> f64 {
        percent(self.present, self.total)
    }
}

/// Result of a coverage check.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    /// Main aircraft document
    pub aircraft_file: PathBuf,
    /// Every document that was scanned
    pub documents: Vec<PathBuf>,
    /// Per-category coverage, sorted by name
    pub categories: Vec<CategoryCoverage>,
    /// Present events over all categories
    pub present: usize,
    /// Events over all categories
    pub total: usize,
}

impl CoverageReport {
    /// Overall percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        percent(self.present, self.total)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(present: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        present as f64 / total as f64 * 100.0
    }
}

/// Pattern that finds an event in a definition document.
///
/// Matches `set: (>B:NAME)`, `set: (>K:NAME)`, a quoted `set:` expression
/// containing either trigger, or `get: L:MD11_NAME`.
fn presence_pattern(event: &str) -> Result<Regex> {
    let name = regex::escape(event);
    let pattern = format!(
        r#"set:\s+\(>[BK]:{name}\)|set:\s+"[^"]*\(>[BK]:{name}\)[^"]*"|set:\s+'[^']*\(>[BK]:{name}\)[^']*'|get:\s+L:{VARIABLE_NAMESPACE}{name}\b"#
    );
    Regex::new(&pattern).with_context(|| format!("Failed to build search pattern for {event}"))
}

/// Scans definition documents and rewrites presence bookkeeping.
pub struct CoverageService<'a> {
    config: &'a Config,
    categories: CategoryService,
}

impl<'a> CoverageService<'a> {
    /// Creates a service for the given configuration.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            categories: CategoryService::new(config.data_dir()),
        }
    }

    /// Checks one category, or all of them, and rewrites their data files.
    ///
    /// # Errors
    ///
    /// Fails on an unknown category, when the aircraft document does not exist,
    /// or when a category file is malformed.
    pub fn run(&self, category: Option<&str>, output_path: Option<&Path>) -> Result<CoverageReport> {
        self.check(category, output_path, true)
    }

    /// Checks one category, or all of them, leaving the data files untouched.
    ///
    /// # Errors
    ///
    /// Same as [`CoverageService::run`].
    pub fn summarize(
        &self,
        category: Option<&str>,
        output_path: Option<&Path>,
    ) -> Result<CoverageReport> {
        self.check(category, output_path, false)
    }

    fn check(
        &self,
        category: Option<&str>,
        output_path: Option<&Path>,
        write_back: bool,
    ) -> Result<CoverageReport> {
        let selected = self.categories.select(category)?;

        let aircraft_file = self.config.aircraft_file(output_path);
        if !aircraft_file.exists() {
            return Err(DefgenError::MissingResource {
                path: aircraft_file,
            }
            .into());
        }

        let modules_dir = Config::modules_dir(&aircraft_file);
        if !modules_dir.is_dir() {
            tracing::warn!("Modules directory not found: {}", modules_dir.display());
        }

        let mut documents = vec![aircraft_file.clone()];
        documents.extend(module_documents(&modules_dir)?);

        let contents = documents
            .iter()
            .map(|path| {
                fs::read_to_string(path)
                    .with_context(|| format!("Failed to read definition file: {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stage = StagedOutput::new();
        let mut coverage = Vec::with_capacity(selected.len());

        for info in &selected {
            let mut data = CategoryService::load(info)?;
            let mut present = HashSet::new();
            let mut missing = Vec::new();

            for event in data.normalized_events() {
                let pattern = presence_pattern(&event.name)?;
                let found_in: Vec<&PathBuf> = documents
                    .iter()
                    .zip(&contents)
                    .filter(|(_, content)| pattern.is_match(content))
                    .map(|(path, _)| path)
                    .collect();

                if found_in.is_empty() {
                    missing.push(event.name);
                } else {
                    tracing::debug!("Found {} in {:?}", event.name, found_in);
                    present.insert(event.name);
                }
            }

            let present_count = data.apply_presence(&present);
            let total = data.total_count.unwrap_or_default();
            if write_back {
                let json = data
                    .to_json_string()
                    .with_context(|| format!("Failed to serialize category '{}'", info.name))?;
                stage.stage_file(&info.path, json);
            }

            coverage.push(CategoryCoverage {
                name: info.name.clone(),
                present: present_count,
                total,
                missing,
            });
        }

        stage.commit()?;

        Ok(CoverageReport {
            present: coverage.iter().map(|c| c.present).sum(),
            total: coverage.iter().map(|c| c.total).sum(),
            aircraft_file,
            documents,
            categories: coverage,
        })
    }
}
