//! Override management commands.

use anyhow::{bail, Context, Result};
use archgate_core::{
    LoadStatus, Override, OverrideCriteria, OverrideStatus, OverrideStore, Report,
};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::config_resolver;

/// `archgate override` subcommands.
#[derive(Debug, Subcommand)]
pub enum OverrideCommand {
    /// Record an override for a rule and file
    Add {
        /// Rule name
        #[arg(long)]
        rule: String,
        /// File path relative to the project root
        #[arg(long)]
        file: PathBuf,
        /// Why the finding is accepted
        #[arg(long)]
        reason: String,
        /// Review status
        #[arg(long, default_value = "approved")]
        status: OverrideStatus,
        /// Code hash of the violation
        #[arg(long)]
        code: Option<String>,
        /// Line of the violation
        #[arg(long)]
        line: Option<usize>,
    },

    /// Approve every current violation of a rule from the last report
    Accept {
        /// Rule name
        #[arg(long)]
        rule: String,
        /// Only accept violations in this file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Why the findings are accepted
        #[arg(long)]
        reason: String,
        /// Canonical JSON report to read (default: from config)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Remove matching overrides
    Remove {
        #[command(flatten)]
        filter: Filter,
    },

    /// List stored overrides
    List {
        /// Only list overrides with this status
        #[arg(long)]
        status: Option<OverrideStatus>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show override statistics
    Stats {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark matching overrides approved
    Approve {
        #[command(flatten)]
        filter: Filter,
    },

    /// Mark matching overrides rejected
    Reject {
        #[command(flatten)]
        filter: Filter,
    },
}

/// Selects overrides by rule, file, code, or status.
#[derive(Debug, Args)]
pub struct Filter {
    /// Rule name
    #[arg(long)]
    rule: Option<String>,
    /// File path
    #[arg(long)]
    file: Option<PathBuf>,
    /// Code hash
    #[arg(long)]
    code: Option<String>,
    /// Status
    #[arg(long)]
    status: Option<OverrideStatus>,
}

impl Filter {
    fn criteria(&self) -> Result<OverrideCriteria> {
        let criteria = OverrideCriteria {
            rule: self.rule.clone(),
            file_path: self.file.clone(),
            code: self.code.clone(),
            status: self.status,
        };
        if criteria.is_empty() {
            bail!("Specify at least one of --rule, --file, --code, --status");
        }
        Ok(criteria)
    }
}

/// Runs an override subcommand against the project in the current directory.
pub fn run(cmd: OverrideCommand, config_path: Option<&Path>) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot read current directory")?;
    run_in(&cwd, cmd, config_path)
}

fn run_in(project_dir: &Path, cmd: OverrideCommand, config_path: Option<&Path>) -> Result<()> {
    let source = config_resolver::resolve(project_dir, config_path);
    let config = source.load()?;
    let root = source.project_root(project_dir);

    let store = OverrideStore::open(root.join(&config.overrides.path), config.overrides.strictness);
    if let LoadStatus::Recovered(e) = store.load() {
        // Mutations would overwrite the unreadable file.
        if !matches!(cmd, OverrideCommand::List { .. } | OverrideCommand::Stats { .. }) {
            bail!("Refusing to modify overrides: {e}");
        }
    }

    match cmd {
        OverrideCommand::Add {
            rule,
            file,
            reason,
            status,
            code,
            line,
        } => {
            let mut record = Override::new(rule, file, reason, status);
            record.code = code;
            record.line = line;
            store.add_override(record)?;
            println!("Recorded override in {}", store.path().display());
        }
        OverrideCommand::Accept {
            rule,
            file,
            reason,
            report,
        } => {
            let path = report.unwrap_or_else(|| root.join(&config.report.dir).join("report.json"));
            let report = Report::from_file(&path)
                .with_context(|| format!("Run `archgate check` first to produce {}", path.display()))?;
            let file = file.map(|f| archgate_core::normalize_path(&f));

            let mut accepted = 0;
            for v in report.results.iter().flat_map(|r| &r.violations) {
                if v.rule != rule || file.as_ref().is_some_and(|f| *f != v.normalized_path()) {
                    continue;
                }
                store.add_override(Override::for_violation(v, reason.clone()))?;
                accepted += 1;
            }
            println!("Accepted {accepted} violation(s) of `{rule}`");
        }
        OverrideCommand::Remove { filter } => {
            let n = store.remove_override(&filter.criteria()?)?;
            println!("Removed {n} override(s)");
        }
        OverrideCommand::Approve { filter } => {
            let n = store.set_status(&filter.criteria()?, OverrideStatus::Approved)?;
            println!("Approved {n} override(s)");
        }
        OverrideCommand::Reject { filter } => {
            let n = store.set_status(&filter.criteria()?, OverrideStatus::Rejected)?;
            println!("Rejected {n} override(s)");
        }
        OverrideCommand::List { status, json } => {
            let records: Vec<Override> = store
                .list_overrides()
                .into_iter()
                .filter(|o| status.map_or(true, |s| o.status == s))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_table(&records);
            }
        }
        OverrideCommand::Stats { json } => {
            let stats = store.statistics();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Total:  {}", stats.total);
                println!("Recent: {} (last 7 days)", stats.recent);
                if !stats.by_rule.is_empty() {
                    println!("\nBy rule:");
                    for (rule, count) in &stats.by_rule {
                        println!("  {rule:<30} {count}");
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_table(records: &[Override]) {
    if records.is_empty() {
        println!("No overrides.");
        return;
    }
    println!("{:<10} {:<25} {:<40} Reason", "Status", "Rule", "File");
    println!("{}", "-".repeat(100));
    for o in records {
        let location = match o.line {
            Some(line) => format!("{}:{line}", o.file_path.display()),
            None => o.file_path.display().to_string(),
        };
        println!(
            "{:<10} {:<25} {:<40} {}",
            o.status.to_string(),
            o.rule,
            location,
            o.reason
        );
    }
}
