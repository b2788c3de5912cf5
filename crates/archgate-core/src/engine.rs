//! Execution engine: runs validators against the candidate file set.

use crate::plugin::{PluginError, PluginOutput};
use crate::types::ValidationResult;
use crate::validator::Validator;

use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while setting up or running validators.
///
/// Only setup errors are returned to callers; per-validator failures are
/// folded into failed [`ValidationResult`]s.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// IO error resolving the project root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// A plugin returned an error.
    #[error("{source}")]
    Plugin {
        /// Validator id.
        id: String,
        /// The plugin error.
        source: PluginError,
    },

    /// A plugin panicked.
    #[error("panicked: {message}")]
    Panicked {
        /// Validator id.
        id: String,
        /// Panic payload, when it was a string.
        message: String,
    },
}

/// Builder for configuring an [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    root: Option<PathBuf>,
    parallelism: Option<usize>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root candidate paths are relative to.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the maximum number of validators run at once.
    ///
    /// `1` runs validators sequentially on the calling thread. Unset uses
    /// the available parallelism.
    #[must_use]
    pub fn parallelism(mut self, workers: Option<usize>) -> Self {
        self.parallelism = workers;
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved or the
    /// worker pool cannot be created.
    pub fn build(self) -> Result<Engine, ExecutionError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let workers = self
            .parallelism
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
            .max(1);

        let pool = if workers > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("archgate-worker-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Engine {
            root,
            workers,
            pool,
        })
    }
}

/// Runs validators and aggregates their outputs.
///
/// Use [`Engine::builder()`] to construct an instance. Every call re-runs
/// every validator; nothing is cached between runs.
pub struct Engine {
    root: PathBuf,
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of workers.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every validator against the full candidate list.
    ///
    /// The output has one result per validator, in input order, whatever
    /// order the validators complete in. A validator that errors or panics
    /// yields a failed result with no violations.
    #[must_use]
    pub fn run_validators(
        &self,
        validators: &[Validator],
        files: &[PathBuf],
    ) -> Vec<ValidationResult> {
        info!(
            "Running {} validator(s) on {} file(s) with {} worker(s)",
            validators.len(),
            files.len(),
            self.workers
        );

        let results: Vec<ValidationResult> = match &self.pool {
            Some(pool) => pool.install(|| {
                validators
                    .par_iter()
                    .map(|v| self.run_one(v, files))
                    .collect()
            }),
            None => validators.iter().map(|v| self.run_one(v, files)).collect(),
        };

        let failed = results.iter().filter(|r| !r.passed).count();
        info!(
            "Execution complete: {} passed, {} failed",
            results.len() - failed,
            failed
        );

        results
    }

    fn run_one(&self, validator: &Validator, files: &[PathBuf]) -> ValidationResult {
        let start = Instant::now();
        debug!("Running validator `{}`", validator.id());

        let result = match self.execute(validator, files) {
            Ok(output) => normalize_output(validator, output),
            Err(e) => {
                warn!("Validator `{}` failed: {}", validator.id(), e);
                ValidationResult::execution_failed(validator.id(), e.to_string())
            }
        };

        debug!(
            "Validator `{}` finished in {:?}: {} violation(s)",
            validator.id(),
            start.elapsed(),
            result.violations.len()
        );
        result
    }

    fn execute(
        &self,
        validator: &Validator,
        files: &[PathBuf],
    ) -> Result<PluginOutput, ExecutionError> {
        let ctx = crate::ValidatorContext::new(validator.id(), validator.config(), &self.root);
        let outcome = catch_unwind(AssertUnwindSafe(|| validator.plugin().check(&ctx, files)));

        match outcome {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(source)) => Err(ExecutionError::Plugin {
                id: validator.id().to_string(),
                source,
            }),
            Err(payload) => Err(ExecutionError::Panicked {
                id: validator.id().to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Turns plugin output into a result, enforcing the violation contract.
fn normalize_output(validator: &Validator, output: PluginOutput) -> ValidationResult {
    let mut violations = output.violations;

    for v in &mut violations {
        if v.rule.is_empty() {
            v.rule = validator.id().to_string();
        }
        if let Some(severity) = validator.config().severity {
            v.severity = severity;
        }
        v.confidence = normalize_confidence(validator.id(), v.confidence);
    }

    let message = output.message.unwrap_or_else(|| {
        if violations.is_empty() {
            "passed".to_string()
        } else {
            format!("{} violation(s) found", violations.len())
        }
    });

    ValidationResult::new(validator.id(), message, violations).with_details(output.details)
}

fn normalize_confidence(id: &str, confidence: Option<f64>) -> Option<f64> {
    match confidence {
        Some(c) if !c.is_finite() => {
            warn!(
                "Validator `{}` reported non-finite confidence; using default",
                id
            );
            None
        }
        Some(c) if !(0.0..=1.0).contains(&c) => {
            warn!(
                "Validator `{}` reported confidence {} outside [0, 1]; clamping",
                id, c
            );
            Some(c.clamp(0.0, 1.0))
        }
        other => other,
    }
}
