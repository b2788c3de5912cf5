//! The validator plugin contract.

use crate::context::ValidatorContext;
use crate::types::Violation;
use crate::validator::ValidatorConfig;
use std::path::PathBuf;

/// Errors a plugin may raise while validating its configuration or running.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The validator configuration is not acceptable to this plugin.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error while reading project files.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Any other analysis failure.
    #[error("{0}")]
    Failed(String),
}

/// What a plugin yields for one run.
///
/// The engine turns this into a [`crate::ValidationResult`], so a plugin
/// never decides `passed` on its own.
#[derive(Debug, Clone, Default)]
pub struct PluginOutput {
    /// Violations found.
    pub violations: Vec<Violation>,
    /// Free-form details (e.g., per-file verdicts).
    pub details: Vec<String>,
    /// Optional summary message; the engine derives one when absent.
    pub message: Option<String>,
}

impl PluginOutput {
    /// Creates an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an output holding the given violations.
    #[must_use]
    pub fn with_violations(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            ..Self::default()
        }
    }

    /// Appends a detail line.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Sets the summary message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A pluggable analysis unit.
///
/// Plugins are pure with respect to each other: they must not share mutable
/// state and must not assume any execution order. A plugin that returns
/// `Err` or panics is reported as a failed result; the rest of the run
/// continues.
///
/// # Example
///
/// ```ignore
/// use archgate_core::{PluginOutput, ValidatorContext, ValidatorPlugin, Violation};
///
/// pub struct NoTodo;
///
/// impl ValidatorPlugin for NoTodo {
///     fn id(&self) -> &'static str { "no-todo" }
///
///     fn check(&self, ctx: &ValidatorContext<'_>, files: &[PathBuf])
///         -> Result<PluginOutput, PluginError>
///     {
///         let mut out = PluginOutput::new();
///         for file in ctx.select(files) {
///             let content = ctx.read(file)?;
///             // ...
///         }
///         Ok(out)
///     }
/// }
/// ```
pub trait ValidatorPlugin: Send + Sync {
    /// Returns the stable registry id of this plugin (e.g., "forbidden-pattern").
    fn id(&self) -> &'static str;

    /// Returns a brief description of what this plugin checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the parameter names this plugin accepts in `params`.
    fn parameters(&self) -> &'static [&'static str] {
        &[]
    }

    /// Validates a validator configuration at load time.
    ///
    /// The default implementation rejects parameters not listed in
    /// [`ValidatorPlugin::parameters`].
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidConfig`] describing the first problem.
    fn validate_config(&self, config: &ValidatorConfig) -> Result<(), PluginError> {
        reject_unknown_params(self.parameters(), config)
    }

    /// Checks the candidate files and returns the findings.
    ///
    /// `files` is the full candidate list shared by all validators; use
    /// [`ValidatorContext::select`] to apply this validator's file pattern.
    ///
    /// # Errors
    ///
    /// Any error marks this validator as failed for the run.
    fn check(
        &self,
        ctx: &ValidatorContext<'_>,
        files: &[PathBuf],
    ) -> Result<PluginOutput, PluginError>;
}

/// Rejects any configured parameter not in `known`.
///
/// # Errors
///
/// Returns [`PluginError::InvalidConfig`] naming the unknown parameters.
pub fn reject_unknown_params(
    known: &[&str],
    config: &ValidatorConfig,
) -> Result<(), PluginError> {
    let unknown: Vec<&str> = config
        .params
        .keys()
        .map(String::as_str)
        .filter(|k| !known.contains(k))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(PluginError::InvalidConfig(format!(
            "unknown parameter(s): {}",
            unknown.join(", ")
        )))
    }
}
