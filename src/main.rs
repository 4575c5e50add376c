//! defgen - FS Copilot definition generator for the TFDi MD-11
//!
//! Regenerates definition documents from category data and reports which
//! events are already covered.

use clap::{Parser, Subcommand};
use defgen::cli::{CheckArgs, CliError, CliErrorKind, CliResult, ExitCode, GenerateArgs};
use defgen::config::Config;
use defgen::constants::{APP_BINARY_NAME, APP_NAME};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// MD-11 Definition Generator - FS Copilot definitions from TFDi control events
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Path to a defgen.toml configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate definition documents from category data
    Generate(GenerateArgs),
    /// Check which category events are present in definition documents
    Check(CheckArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| CliError::from_anyhow(&e, CliErrorKind::Validation))?;

    match &cli.command {
        Command::Generate(args) => args.execute(&config),
        Command::Check(args) => args.execute(&config),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::Usage
            } else {
                ExitCode::Success
            };
            // Printing help or usage can only fail on a closed stdout
            let _ = e.print();
            std::process::exit(code.code());
        }
    };

    init_tracing(cli.verbose);
    tracing::debug!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code().code());
    }
}
