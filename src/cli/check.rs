//! Check command: coverage of category events in definition documents.

use crate::cli::common::{CliError, CliErrorKind, CliResult};
use crate::config::Config;
use crate::services::{CoverageReport, CoverageService};
use clap::Args;
use std::path::PathBuf;

/// Check which category events are present in definition files
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Category to check (all categories when omitted)
    #[arg(value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Directory of the aircraft definition document
    #[arg(long = "output-path", visible_alias = "output", value_name = "DIR")]
    pub output_path: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let report = CoverageService::new(config)
            .run(self.category.as_deref(), self.output_path.as_deref())
            .map_err(|e| CliError::from_anyhow(&e, CliErrorKind::Io))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            print_report(&report);
        }

        Ok(())
    }
}

fn print_report(report: &CoverageReport) {
    println!("Aircraft file: {}", report.aircraft_file.display());
    println!("Scanned {} definition files", report.documents.len());
    println!();

    for category in &report.categories {
        let mark = if category.present == category.total {
            "✓"
        } else {
            "•"
        };
        println!(
            "{mark} {}: {}/{} events present ({:.1}%)",
            category.name,
            category.present,
            category.total,
            category.percent()
        );
    }

    println!();
    print_summary(report);
}

/// Prints the overall coverage lines.
pub fn print_summary(report: &CoverageReport) {
    println!(
        "Summary: {}/{} events are present in definition files",
        report.present, report.total
    );
    if report.total > 0 {
        println!("Coverage: {:.1}%", report.percent());
    }
}
