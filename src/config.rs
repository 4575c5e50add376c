//! Configuration management for the application.
//!
//! This module handles loading and validating the optional `defgen.toml`
//! configuration, and resolving the data and output locations derived from it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{AIRCRAFT_FILE, MODULES_SUBDIR};
use crate::error::DefgenError;

/// File name looked up in the working directory when no `--config` is given.
pub const LOCAL_CONFIG_FILE: &str = "defgen.toml";

/// Path configuration for file system locations.
///
/// Relative paths are resolved against the directory of the config file they
/// were read from, or against the working directory for built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory containing `<category>.json` files and `variables.json`
    pub data_dir: PathBuf,
    /// Directory containing XML control templates (optional at runtime)
    pub xml_dir: PathBuf,
    /// Default directory of the aircraft definition document
    pub definitions_dir: PathBuf,
    /// Overrides `definitions_dir` as the aircraft document's directory
    pub output_path: Option<PathBuf>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("tfdi-md11-data/json"),
            xml_dir: PathBuf::from("tfdi-md11-data/xml"),
            definitions_dir: PathBuf::from("Definitions"),
            output_path: None,
        }
    }
}

/// A functional area that pools several categories into one module document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroupConfig {
    /// Area name, used in the module file name (e.g. "Overhead")
    pub name: String,
    /// Category names belonging to this area, in output order
    pub categories: Vec<String>,
}

impl CategoryGroupConfig {
    fn new(name: &str, categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            categories: categories.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Cockpit areas used by `--split-grouped` when the config does not list any.
fn default_groups() -> Vec<CategoryGroupConfig> {
    vec![
        CategoryGroupConfig::new(
            "Glareshield",
            &["glareshield_left", "glareshield_right", "center_glareshield"],
        ),
        CategoryGroupConfig::new("Overhead", &["overhead_panel", "aft_overhead_panel"]),
        CategoryGroupConfig::new(
            "Pedestal",
            &["pedestal", "radio_panel", "audio_panel", "throttle"],
        ),
        CategoryGroupConfig::new(
            "Instruments",
            &[
                "main_instruments_panel",
                "left_side_panel",
                "right_side_panel",
                "center_panel",
                "left_ecp",
                "right_ecp",
            ],
        ),
        CategoryGroupConfig::new(
            "Flight_Controls",
            &["flight_controls", "left_yoke", "right_yoke"],
        ),
        CategoryGroupConfig::new("FMC", &["fmc_cdu"]),
    ]
}

/// Application configuration.
///
/// # File Location
///
/// Looked up in this order:
/// 1. The path given with `--config`
/// 2. `./defgen.toml`
/// 3. `<platform config dir>/defgen/config.toml`
///
/// When none exists the built-in defaults are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Functional areas for grouped split output
    #[serde(default = "default_groups")]
    pub groups: Vec<CategoryGroupConfig>,
    /// Directory that relative paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Config {
    /// Creates a new Config with default values rooted at the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: PathConfig::default(),
            groups: default_groups(),
            base_dir: PathBuf::new(),
        }
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/defgen/`
    /// - macOS: `~/Library/Application Support/defgen/`
    /// - Windows: `%APPDATA%\defgen\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("defgen");

        Ok(config_dir)
    }

    /// Gets the full path to the per-user config file.
    pub fn user_config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration, honouring an explicit path first.
    ///
    /// An explicit path that does not exist is an error; the implicit locations
    /// are simply skipped when missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DefgenError::MissingResource {
                    path: path.to_path_buf(),
                }
                .into());
            }
            return Self::load_from(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Ok(user_path) = Self::user_config_file_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        Ok(Self::new())
    }

    /// Loads configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - group names are non-empty and unique
    /// - no category is listed in more than one group
    pub fn validate(&self) -> Result<()> {
        let mut group_names = HashSet::new();
        let mut seen_categories = HashSet::new();

        for group in &self.groups {
            if group.name.trim().is_empty() {
                anyhow::bail!("Category group name cannot be empty");
            }
            if !group_names.insert(group.name.as_str()) {
                anyhow::bail!("Duplicate category group '{}'", group.name);
            }
            for category in &group.categories {
                if !seen_categories.insert(category.as_str()) {
                    anyhow::bail!(
                        "Category '{}' is listed in more than one group (last seen in '{}')",
                        category,
                        group.name
                    );
                }
            }
        }

        Ok(())
    }

    /// Resolves a configured path against the config file's directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Directory holding the category JSON files.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.resolve(&self.paths.data_dir)
    }

    /// Directory holding the optional XML control templates.
    #[must_use]
    pub fn xml_dir(&self) -> PathBuf {
        self.resolve(&self.paths.xml_dir)
    }

    /// Path of the aircraft document.
    ///
    /// A command-line output directory wins over `paths.output_path`, which wins
    /// over `paths.definitions_dir`. Command-line paths are taken relative to the
    /// working directory, not the config file.
    #[must_use]
    pub fn aircraft_file(&self, cli_output: Option<&Path>) -> PathBuf {
        let dir = match (cli_output, &self.paths.output_path) {
            (Some(dir), _) => strip_trailing_separators(dir),
            (None, Some(dir)) => self.resolve(&strip_trailing_separators(dir)),
            (None, None) => self.resolve(&self.paths.definitions_dir),
        };
        dir.join(AIRCRAFT_FILE)
    }

    /// Directory of module documents that sit next to the given aircraft document.
    #[must_use]
    pub fn modules_dir(aircraft_file: &Path) -> PathBuf {
        aircraft_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join(MODULES_SUBDIR)
    }

    /// Looks up the functional area a category belongs to.
    #[must_use]
    pub fn group_of(&self, category: &str) -> Option<&CategoryGroupConfig> {
        self.groups
            .iter()
            .find(|group| group.categories.iter().any(|c| c == category))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes trailing `/` or `\` so `out/` and `out` name the same directory.
fn strip_trailing_separators(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
