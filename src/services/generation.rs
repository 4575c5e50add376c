//! Generation runs: category data in, definition documents out.
//!
//! A run renders every selected category, recomposes the aircraft document and
//! any module documents, rewrites presence bookkeeping, and commits all of it
//! only after every document has validated.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::categories::CategoryService;
use crate::config::Config;
use crate::constants::{module_file_name, module_include_path, MODULE_FILE_PREFIX};
use crate::document::merge::{
    add_include, displace_colliding, reconcile, retain_manual, set_module_includes, MergeStats,
};
use crate::document::{PersistedDocument, StagedOutput};
use crate::metadata::MetadataContext;
use crate::models::{CategoryData, CategoryInfo, KnownVariableSet, RawEvent, RenderedEntry};
use crate::pipeline::build_groups;
use crate::render::render_groups;

/// Where generated entries go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLayout {
    /// Everything in the aircraft document
    #[default]
    Merged,
    /// One module document per category
    Split,
    /// One module document per functional area
    SplitGrouped,
}

/// Options of one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Single category to regenerate; all categories when `None`
    pub category: Option<String>,
    /// Output layout
    pub layout: OutputLayout,
    /// Directory of the aircraft document, overriding the configuration
    pub output_path: Option<PathBuf>,
}

/// Bookkeeping outcome for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOutcome {
    /// Category name
    pub name: String,
    /// Events with an identifier
    pub total: usize,
    /// Events accounted for by a rendered entry
    pub present: usize,
}

/// A module document written by the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    /// Module name (category or area)
    pub name: String,
    /// Module document path
    pub path: PathBuf,
    /// Entries in the module
    pub entries: usize,
    /// Entries synchronized through a state variable
    pub variable_syncs: usize,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Aircraft document path
    pub aircraft_file: PathBuf,
    /// Effective layout
    pub layout: OutputLayout,
    /// Per-category bookkeeping
    pub categories: Vec<CategoryOutcome>,
    /// Module documents written
    pub modules: Vec<ModuleOutcome>,
    /// What happened to the aircraft document's entry region
    pub merge: MergeStats,
    /// Stale module documents removed
    pub deleted: Vec<PathBuf>,
}

/// A selected category with its data.
struct LoadedCategory {
    info: CategoryInfo,
    data: CategoryData,
    description: String,
}

/// Categories rendered together into one entry list.
struct OutputUnit {
    name: String,
    description: String,
    members: Vec<usize>,
}

/// A rendered unit.
struct RenderedUnit {
    unit: OutputUnit,
    entries: Vec<RenderedEntry>,
}

/// Runs generation against a configuration.
pub struct GenerationService<'a> {
    config: &'a Config,
    categories: CategoryService,
}

impl<'a> GenerationService<'a> {
    /// Creates a service for the given configuration.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            categories: CategoryService::new(config.data_dir()),
        }
    }

    /// Runs one generation.
    ///
    /// # Errors
    ///
    /// Fails on an unknown category before anything is read, on malformed input,
    /// and when any recomposed document fails validation. Nothing is written in
    /// those cases.
    pub fn run(&self, options: &GenerateOptions) -> Result<GenerationReport> {
        let selected = self.categories.select(options.category.as_deref())?;
        let single = options.category.is_some();
        let layout = match options.layout {
            OutputLayout::SplitGrouped if single => OutputLayout::Split,
            other => other,
        };

        let variables = self.categories.load_variables()?;
        let metadata = MetadataContext::load(&self.config.xml_dir());

        let loaded = selected
            .into_iter()
            .map(|info| {
                let data = CategoryService::load(&info)?;
                let description = CategoryService::description(&info, &data);
                Ok(LoadedCategory {
                    info,
                    data,
                    description,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let units = match layout {
            OutputLayout::SplitGrouped => self.grouped_units(&loaded),
            OutputLayout::Merged | OutputLayout::Split => individual_units(&loaded),
        };

        let rendered: Vec<RenderedUnit> = units
            .into_iter()
            .map(|unit| {
                let entries = render_unit(&loaded, &unit, &variables, &metadata);
                tracing::info!("Rendered {} entries for {}", entries.len(), unit.name);
                RenderedUnit { unit, entries }
            })
            .collect();

        let aircraft_file = self.config.aircraft_file(options.output_path.as_deref());
        let modules_dir = Config::modules_dir(&aircraft_file);
        let document = PersistedDocument::load_or_bootstrap(&aircraft_file)?;

        let mut stage = StagedOutput::new();
        let mut modules = Vec::new();
        let mut deleted_candidates = Vec::new();

        let all_entries: Vec<RenderedEntry> = rendered
            .iter()
            .flat_map(|r| r.entries.iter().cloned())
            .collect();

        let merge = match (layout, single) {
            (OutputLayout::Merged, _) => {
                let mut result = reconcile(&document, &all_entries);
                if !single {
                    set_module_includes(&mut result.document, &[]);
                    deleted_candidates = module_documents(&modules_dir)?;
                }
                stage.stage_document(&aircraft_file, &result.document)?;
                result.stats
            }
            (_, true) => {
                modules = stage_modules(&mut stage, &modules_dir, &rendered)?;
                let mut result = displace_colliding(&document, &all_entries);
                for unit in &rendered {
                    add_include(&mut result.document, &module_include_path(&unit.unit.name));
                }
                stage.stage_document(&aircraft_file, &result.document)?;
                result.stats
            }
            (_, false) => {
                modules = stage_modules(&mut stage, &modules_dir, &rendered)?;
                let mut result = retain_manual(&document, &all_entries);
                let includes: Vec<String> = rendered
                    .iter()
                    .map(|r| module_include_path(&r.unit.name))
                    .collect();
                set_module_includes(&mut result.document, &includes);
                deleted_candidates = module_documents(&modules_dir)?;
                stage.stage_document(&aircraft_file, &result.document)?;
                result.stats
            }
        };

        for path in &deleted_candidates {
            stage.stage_deletion(path);
        }

        let categories = stage_bookkeeping(&mut stage, &loaded, &rendered)?;

        let summary = stage.commit()?;
        tracing::info!(
            "Wrote {} files, removed {} stale modules",
            summary.written.len(),
            summary.deleted.len()
        );

        Ok(GenerationReport {
            aircraft_file,
            layout,
            categories,
            modules,
            merge,
            deleted: summary.deleted,
        })
    }

    /// Units per configured functional area, plus one per ungrouped category.
    fn grouped_units(&self, loaded: &[LoadedCategory]) -> Vec<OutputUnit> {
        let mut units = Vec::new();
        let mut assigned = HashSet::new();

        for group in &self.config.groups {
            let members: Vec<usize> = group
                .categories
                .iter()
                .filter_map(|name| loaded.iter().position(|c| &c.info.name == name))
                .collect();

            if members.is_empty() {
                tracing::debug!("Skipping area {} (no categories)", group.name);
                continue;
            }
            assigned.extend(members.iter().copied());

            let parts: Vec<String> = members
                .iter()
                .map(|&idx| {
                    let category = &loaded[idx];
                    format!(
                        "{} ({} events)",
                        category.description,
                        category.data.normalized_events().len()
                    )
                })
                .collect();

            units.push(OutputUnit {
                name: group.name.clone(),
                description: format!("{} ({})", group.name.replace('_', " "), parts.join(", ")),
                members,
            });
        }

        for (idx, category) in loaded.iter().enumerate() {
            if assigned.contains(&idx) {
                continue;
            }
            tracing::warn!(
                "Category '{}' is not in any area; writing it to its own module",
                category.info.name
            );
            units.push(OutputUnit {
                name: category.info.name.clone(),
                description: category.description.clone(),
                members: vec![idx],
            });
        }

        units
    }
}

fn individual_units(loaded: &[LoadedCategory]) -> Vec<OutputUnit> {
    loaded
        .iter()
        .enumerate()
        .map(|(idx, category)| OutputUnit {
            name: category.info.name.clone(),
            description: category.description.clone(),
            members: vec![idx],
        })
        .collect()
}

/// Pools the raw events of a unit's categories and renders them.
fn render_unit(
    loaded: &[LoadedCategory],
    unit: &OutputUnit,
    variables: &KnownVariableSet,
    metadata: &MetadataContext,
) -> Vec<RenderedEntry> {
    let raw: Vec<RawEvent> = unit
        .members
        .iter()
        .flat_map(|&idx| loaded[idx].data.events.iter().cloned())
        .collect();

    let groups = build_groups(&raw, variables, metadata);
    render_groups(&groups, metadata)
}

fn stage_modules(
    stage: &mut StagedOutput,
    modules_dir: &Path,
    rendered: &[RenderedUnit],
) -> Result<Vec<ModuleOutcome>> {
    let mut modules = Vec::with_capacity(rendered.len());

    for unit in rendered {
        let path = modules_dir.join(module_file_name(&unit.unit.name));
        let document = PersistedDocument::module(&unit.unit.description, &unit.entries);
        stage.stage_document(&path, &document)?;

        modules.push(ModuleOutcome {
            name: unit.unit.name.clone(),
            path,
            entries: unit.entries.len(),
            variable_syncs: unit.entries.iter().filter(|e| e.get.is_some()).count(),
        });
    }

    Ok(modules)
}

/// Module documents next to the aircraft document, sorted; a full run replaces all of them.
pub(crate) fn module_documents(modules_dir: &Path) -> Result<Vec<PathBuf>> {
    if !modules_dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(modules_dir)
        .with_context(|| format!("Failed to read modules directory: {}", modules_dir.display()))?;

    let mut stale: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(MODULE_FILE_PREFIX) && name.ends_with(".yaml"))
        })
        .collect();
    stale.sort();
    Ok(stale)
}

/// Stages the rewritten category files.
fn stage_bookkeeping(
    stage: &mut StagedOutput,
    loaded: &[LoadedCategory],
    rendered: &[RenderedUnit],
) -> Result<Vec<CategoryOutcome>> {
    let mut outcomes = Vec::with_capacity(loaded.len());

    for unit in rendered {
        let present: HashSet<String> = unit
            .entries
            .iter()
            .flat_map(|entry| entry.events.iter().cloned())
            .collect();

        for &idx in &unit.unit.members {
            let category = &loaded[idx];
            let mut data = category.data.clone();
            let present_count = data.apply_presence(&present);
            let total = data.total_count.unwrap_or_default();

            if present_count < total {
                tracing::debug!(
                    "{}: {} of {} events not rendered",
                    category.info.name,
                    total - present_count,
                    total
                );
            }

            let json = data.to_json_string().with_context(|| {
                format!("Failed to serialize category '{}'", category.info.name)
            })?;
            stage.stage_file(&category.info.path, json);

            outcomes.push(CategoryOutcome {
                name: category.info.name.clone(),
                total,
                present: present_count,
            });
        }
    }

    outcomes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(outcomes)
}
