//! Generate command for definition documents.

use crate::cli::check::print_summary;
use crate::cli::common::{CliError, CliErrorKind, CliResult};
use crate::config::Config;
use crate::services::{
    CoverageService, GenerateOptions, GenerationReport, GenerationService, OutputLayout,
};
use clap::Args;
use std::path::PathBuf;

/// Generate FS Copilot definitions from category data
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Category to regenerate (all categories when omitted)
    #[arg(value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Write one module document per category
    #[arg(long)]
    pub split: bool,

    /// Write one module document per functional area (implies --split)
    #[arg(long)]
    pub split_grouped: bool,

    /// Directory of the aircraft definition document
    #[arg(long = "output-path", visible_alias = "output", value_name = "DIR")]
    pub output_path: Option<PathBuf>,
}

impl GenerateArgs {
    /// Output layout selected by the flags.
    #[must_use]
    pub const fn layout(&self) -> OutputLayout {
        if self.split_grouped {
            OutputLayout::SplitGrouped
        } else if self.split {
            OutputLayout::Split
        } else {
            OutputLayout::Merged
        }
    }

    /// Execute the generate command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        if self.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(CliError::usage("Category name cannot be empty"));
        }

        let options = GenerateOptions {
            category: self.category.clone(),
            layout: self.layout(),
            output_path: self.output_path.clone(),
        };

        let report = GenerationService::new(config)
            .run(&options)
            .map_err(|e| CliError::from_anyhow(&e, CliErrorKind::Io))?;

        print_report(&report, self.category.as_deref());

        if self.category.is_none() {
            match CoverageService::new(config).summarize(None, self.output_path.as_deref()) {
                Ok(coverage) => {
                    println!();
                    print_summary(&coverage);
                }
                Err(e) => tracing::warn!("Coverage summary unavailable: {e:#}"),
            }
        }
        Ok(())
    }
}

fn print_report(report: &GenerationReport, category: Option<&str>) {
    let mode = match report.layout {
        OutputLayout::Merged => "merged",
        OutputLayout::Split => "split",
        OutputLayout::SplitGrouped => "split by area",
    };
    match category {
        Some(name) => println!("✓ Regenerated {name} ({mode})"),
        None => println!("✓ Regenerated all categories ({mode})"),
    }

    println!("  Aircraft file: {}", report.aircraft_file.display());
    println!(
        "  Entries: {} kept, {} generated replaced, {} colliding replaced, {} added",
        report.merge.kept, report.merge.dropped_generated, report.merge.replaced, report.merge.added
    );

    for module in &report.modules {
        println!(
            "  ✓ {}: {} entries ({} variable syncs)",
            module.path.display(),
            module.entries,
            module.variable_syncs
        );
    }

    if !report.deleted.is_empty() {
        println!("  Removed {} stale module files", report.deleted.len());
    }

    for outcome in &report.categories {
        println!(
            "  {}: {}/{} events rendered",
            outcome.name, outcome.present, outcome.total
        );
    }
}
