//! Category data file I/O service.
//!
//! Centralizes discovery and loading of `<category>.json` files and the
//! known-variable set that sits next to them.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::VARIABLES_FILE;
use crate::error::DefgenError;
use crate::models::{title_case_name, CategoryData, CategoryInfo, KnownVariableSet};

/// Service for the category data directory.
#[derive(Debug, Clone)]
pub struct CategoryService {
    data_dir: PathBuf,
}

impl CategoryService {
    /// Creates a service rooted at the data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Lists every category data file, sorted by name.
    ///
    /// `variables.json` is not a category.
    ///
    /// # Errors
    ///
    /// Returns [`DefgenError::MissingResource`] when the data directory does not exist.
    pub fn catalog(&self) -> Result<Vec<CategoryInfo>> {
        if !self.data_dir.is_dir() {
            return Err(DefgenError::MissingResource {
                path: self.data_dir.clone(),
            }
            .into());
        }

        let entries = fs::read_dir(&self.data_dir).with_context(|| {
            format!("Failed to read data directory: {}", self.data_dir.display())
        })?;

        let mut categories = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read entry in {}", self.data_dir.display()))?
                .path();

            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let is_variables = path.file_name().is_some_and(|name| name == VARIABLES_FILE);
            if !is_json || is_variables || !path.is_file() {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                categories.push(CategoryInfo {
                    name: stem.to_string(),
                    path: path.clone(),
                });
            }
        }

        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Resolves the categories a command operates on: one by name, or all.
    ///
    /// # Errors
    ///
    /// Returns [`DefgenError::UnknownCategory`] listing the available names when
    /// `name` is not in the catalog.
    pub fn select(&self, name: Option<&str>) -> Result<Vec<CategoryInfo>> {
        let catalog = self.catalog()?;
        let Some(name) = name else {
            return Ok(catalog);
        };

        match catalog.iter().find(|info| info.name == name) {
            Some(info) => Ok(vec![info.clone()]),
            None => Err(DefgenError::UnknownCategory {
                name: name.to_string(),
                available: catalog
                    .iter()
                    .map(|info| info.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into()),
        }
    }

    /// Loads one category data file.
    ///
    /// # Errors
    ///
    /// Returns [`DefgenError::MalformedInput`] when the file is not category JSON.
    pub fn load(info: &CategoryInfo) -> Result<CategoryData> {
        let content = fs::read_to_string(&info.path)
            .with_context(|| format!("Failed to read category file: {}", info.path.display()))?;

        let data =
            CategoryData::from_json_str(&content).map_err(|e| DefgenError::MalformedInput {
                path: info.path.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            "Loaded category '{}' with {} events",
            info.name,
            data.events.len()
        );
        Ok(data)
    }

    /// Loads the known-variable set.
    ///
    /// A missing file is not fatal: every control then falls back to direct
    /// triggers.
    ///
    /// # Errors
    ///
    /// Returns [`DefgenError::MalformedInput`] when the file exists but is not valid.
    pub fn load_variables(&self) -> Result<KnownVariableSet> {
        let path = self.data_dir.join(VARIABLES_FILE);
        if !path.exists() {
            tracing::warn!(
                "{} not found; no state variables will be synchronized",
                path.display()
            );
            return Ok(KnownVariableSet::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read variables file: {}", path.display()))?;

        let variables: KnownVariableSet =
            serde_json::from_str(&content).map_err(|e| DefgenError::MalformedInput {
                path: path.clone(),
                message: e.to_string(),
            })?;

        tracing::info!("Loaded {} known variables", variables.len());
        Ok(variables)
    }

    /// Human-readable description of a category.
    #[must_use]
    pub fn description(info: &CategoryInfo, data: &CategoryData) -> String {
        data.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(|| title_case_name(&info.name), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CategoryService) {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("pedestal.json"), r#"{"events": ["PED_WX_BT_LEFT_BUTTON_DOWN"]}"#)
            .unwrap();
        fs::write(
            dir.join("overhead_panel.json"),
            r#"{"description": "Overhead", "events": []}"#,
        )
        .unwrap();
        fs::write(dir.join("variables.json"), r#"{"variables": ["MD11_PED_WX_BT"]}"#).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        let service = CategoryService::new(dir);
        (temp_dir, service)
    }

    #[test]
    fn test_catalog_sorted_without_variables() {
        let (_temp_dir, service) = setup();
        let names: Vec<String> = service
            .catalog()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["overhead_panel", "pedestal"]);
    }

    #[test]
    fn test_missing_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let service = CategoryService::new(temp_dir.path().join("nope"));
        let err = service.catalog().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DefgenError>(),
            Some(DefgenError::MissingResource { .. })
        ));
    }

    #[test]
    fn test_select_unknown_lists_available() {
        let (_temp_dir, service) = setup();
        let err = service.select(Some("cockpit")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown category 'cockpit'"));
        assert!(message.contains("overhead_panel, pedestal"));

        assert_eq!(service.select(Some("pedestal")).unwrap().len(), 1);
        assert_eq!(service.select(None).unwrap().len(), 2);
    }

    #[test]
    fn test_load_and_description() {
        let (_temp_dir, service) = setup();
        let catalog = service.catalog().unwrap();

        let overhead = CategoryService::load(&catalog[0]).unwrap();
        assert_eq!(CategoryService::description(&catalog[0], &overhead), "Overhead");

        let pedestal = CategoryService::load(&catalog[1]).unwrap();
        assert_eq!(pedestal.events.len(), 1);
        assert_eq!(CategoryService::description(&catalog[1], &pedestal), "Pedestal");
    }

    #[test]
    fn test_malformed_category() {
        let (temp_dir, service) = setup();
        fs::write(temp_dir.path().join("broken.json"), r#"{"events": 5}"#).unwrap();
        let info = service
            .catalog()
            .unwrap()
            .into_iter()
            .find(|c| c.name == "broken")
            .unwrap();
        let err = CategoryService::load(&info).unwrap_err();
        assert!(err.downcast_ref::<DefgenError>().is_some_and(DefgenError::is_validation));
    }

    #[test]
    fn test_load_variables() {
        let (temp_dir, service) = setup();
        assert!(service.load_variables().unwrap().contains("MD11_PED_WX_BT"));

        fs::remove_file(temp_dir.path().join("variables.json")).unwrap();
        assert!(service.load_variables().unwrap().is_empty());
    }
}
