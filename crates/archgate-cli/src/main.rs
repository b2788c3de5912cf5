//! archgate CLI tool.
//!
//! Usage:
//! ```bash
//! archgate check [OPTIONS] [PATH]
//! archgate list-validators
//! archgate override <add|accept|remove|list|stats|approve|reject>
//! archgate init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod selector;

/// Pluggable architecture-compliance checks
#[derive(Parser)]
#[command(name = "archgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ARCHGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run validators and produce a report
    Check(commands::check::CheckArgs),

    /// List registered plugins, configured validators, and profiles
    ListValidators,

    /// Manage accepted false positives
    #[command(subcommand)]
    Override(commands::overrides::OverrideCommand),

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for the terminal rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Canonical JSON report.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Markdown document.
    Markdown,
}

/// Exit status for a successful run with no failing validator.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status when at least one validator failed.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for load, configuration, or setup errors.
pub const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Check(args) => commands::check::run(&args, config),
        Commands::ListValidators => {
            commands::list_validators::run(config)?;
            Ok(EXIT_SUCCESS)
        }
        Commands::Override(cmd) => {
            commands::overrides::run(cmd, config)?;
            Ok(EXIT_SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(EXIT_SUCCESS)
        }
    }
}
