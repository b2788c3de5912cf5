//! Check command implementation.

use anyhow::{bail, Context, Result};
use archgate_core::{
    ConfidenceThreshold, Engine, OverrideStore, Pipeline, ProjectConfig,
    ReportWriter, ValidatorRequest,
};
use archgate_rules::builtin_registry;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config_resolver;
use crate::selector::Selector;
use crate::{OutputFormat, EXIT_ERROR, EXIT_FAILURE, EXIT_SUCCESS};

/// Arguments of `archgate check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to analyze (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Run this validator (repeatable)
    #[arg(long = "validator", value_name = "ID", conflicts_with = "profile")]
    pub validators: Vec<String>,

    /// Run every enabled validator of this profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Drop violations below this confidence (0.0 to 1.0)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Terminal output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Directory for report artifacts (default: from config)
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Do not write report artifacts
    #[arg(long, conflicts_with = "report_dir")]
    pub no_report: bool,

    /// Ignore the override store
    #[arg(long)]
    pub no_overrides: bool,

    /// Maximum number of validators run concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// Runs the check command and returns the process exit status.
pub fn run(args: &CheckArgs, config_path: Option<&Path>) -> Result<u8> {
    let source = config_resolver::resolve(&args.path, config_path);
    let config = source.load()?;

    let target = std::fs::canonicalize(&args.path)
        .with_context(|| format!("Cannot access {}", args.path.display()))?;
    let root = std::fs::canonicalize(source.project_root(&target))
        .unwrap_or_else(|_| target.clone());

    let request = build_request(args, &config)?;
    let threshold = match args.threshold {
        Some(t) => Some(ConfidenceThreshold::new(t).context("Invalid --threshold")?),
        None => config.confidence_threshold(),
    };

    let report_dir = match &args.report_dir {
        Some(dir) if dir.is_relative() => std::env::current_dir()?.join(dir),
        Some(dir) => dir.clone(),
        None => root.join(&config.report.dir),
    };
    let override_path = root.join(&config.overrides.path);

    let selector = Selector::new(&config.selector, &args.exclude)?
        .excluding_artifacts(&root, &report_dir, &override_path)?;
    let files = selector.discover(&root, &target)?;

    let engine = Engine::builder()
        .root(&root)
        .parallelism(args.jobs.or(config.engine.parallelism))
        .build()
        .context("Failed to build engine")?;

    let store = if args.no_overrides {
        None
    } else {
        let store = OverrideStore::open(override_path, config.overrides.strictness);
        store.load();
        Some(store)
    };

    let registry = builtin_registry();
    tracing::info!("Checking {} with {} candidate file(s)", root.display(), files.len());

    let mut pipeline = Pipeline::new(&config, &registry, &engine).threshold(threshold);
    if let Some(store) = &store {
        pipeline = pipeline.overrides(store);
    }

    let output = match pipeline.run(&request, &files) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            return Ok(EXIT_ERROR);
        }
    };

    super::output::print(&output.report, args.format)?;

    if !args.no_report {
        if let Err(e) = ReportWriter::new(&report_dir).write(&output.report, &config.report.formats) {
            tracing::error!("{}", e);
            return Ok(EXIT_ERROR);
        }
    }

    if output.outcome.is_success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}

/// Decides what to run: explicit validators, then `--profile`, then the
/// configured default profile, then every configured validator.
fn build_request(args: &CheckArgs, config: &ProjectConfig) -> Result<ValidatorRequest> {
    if let [single] = args.validators.as_slice() {
        return Ok(ValidatorRequest::Single(single.clone()));
    }
    if !args.validators.is_empty() {
        return Ok(ValidatorRequest::List(args.validators.clone()));
    }
    if let Some(profile) = args.profile.as_ref().or(config.default_profile.as_ref()) {
        return Ok(ValidatorRequest::Profile(profile.clone()));
    }
    if !config.validators.is_empty() {
        return Ok(ValidatorRequest::List(
            config.validators.iter().map(|v| v.id.clone()).collect(),
        ));
    }
    bail!("Nothing to run: pass --validator or --profile, or define validators in archgate.toml (see `archgate init`)")
}
