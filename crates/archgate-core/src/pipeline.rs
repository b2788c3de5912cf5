//! One complete run: load, execute, suppress, filter, report.

use crate::config::ProjectConfig;
use crate::engine::Engine;
use crate::filter::filter_by_threshold;
use crate::loader::{LoadError, ValidatorLoader, ValidatorRequest};
use crate::model::ConfidenceThreshold;
use crate::overrides::OverrideStore;
use crate::registry::PluginRegistry;
use crate::report::{Report, RunMetadata};
use crate::types::{RunOutcome, ValidationResult};
use std::path::PathBuf;
use tracing::info;

/// Result of [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The final report.
    pub report: Report,
    /// Success or failure of the run.
    pub outcome: RunOutcome,
    /// Violations removed by approved overrides.
    pub overridden: usize,
    /// Violations removed by the confidence threshold.
    pub below_threshold: usize,
}

/// Wires the loader, engine, override store, and confidence filter together.
#[derive(Debug)]
pub struct Pipeline<'a> {
    config: &'a ProjectConfig,
    registry: &'a PluginRegistry,
    engine: &'a Engine,
    overrides: Option<&'a OverrideStore>,
    threshold: Option<ConfidenceThreshold>,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline without overrides and with the configured threshold.
    #[must_use]
    pub fn new(config: &'a ProjectConfig, registry: &'a PluginRegistry, engine: &'a Engine) -> Self {
        Self {
            config,
            registry,
            engine,
            overrides: None,
            threshold: config.confidence_threshold(),
        }
    }

    /// Applies approved overrides from `store` after execution.
    #[must_use]
    pub fn overrides(mut self, store: &'a OverrideStore) -> Self {
        self.overrides = Some(store);
        self
    }

    /// Replaces the confidence threshold.
    #[must_use]
    pub fn threshold(mut self, threshold: Option<ConfidenceThreshold>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Runs the validators named by `request` against `files`.
    ///
    /// # Errors
    ///
    /// Returns the load error if any requested validator cannot be
    /// resolved; nothing executes in that case. Once execution starts the
    /// run always produces a report.
    pub fn run(&self, request: &ValidatorRequest, files: &[PathBuf]) -> Result<RunOutput, LoadError> {
        let validators = ValidatorLoader::new(self.config, self.registry).load(request)?;
        let ids: Vec<String> = validators.iter().map(|v| v.id().to_string()).collect();

        let results = self.engine.run_validators(&validators, files);
        let raw = total_violations(&results);

        let results = match self.overrides {
            Some(store) => store.apply(results),
            None => results,
        };
        let after_overrides = total_violations(&results);

        let results = filter_by_threshold(results, self.threshold);
        let after_filter = total_violations(&results);

        let metadata = RunMetadata::new(files.len())
            .with_threshold(self.threshold)
            .with_profile(request.profile_name())
            .with_validators(ids);
        let outcome = RunOutcome::from_results(&results);
        let report = Report::build(results, metadata);

        info!(
            "Run finished: {} violation(s) reported, {} overridden, {} below threshold",
            after_filter,
            raw - after_overrides,
            after_overrides - after_filter
        );

        Ok(RunOutput {
            report,
            outcome,
            overridden: raw - after_overrides,
            below_threshold: after_overrides - after_filter,
        })
    }
}

fn total_violations(results: &[ValidationResult]) -> usize {
    results.iter().map(|r| r.violations.len()).sum()
}
