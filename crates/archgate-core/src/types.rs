//! Core types for violations and validation results.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Confidence assumed for violations whose plugin did not report one.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Severity level for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a lowercase severity name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single issue reported by a validator plugin.
///
/// Violations are never edited after creation; filtering passes only
/// remove them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule name (e.g., "no-eval").
    pub rule: String,
    /// File path relative to the project root.
    pub file_path: PathBuf,
    /// Line number (1-indexed, 0 when the violation is file-wide).
    pub line: usize,
    /// Human-readable message.
    pub message: String,
    /// Estimated probability that this is a true positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Severity of this violation.
    pub severity: Severity,
    /// Stable content hash used to key overrides more precisely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Optional hint describing how to fix the violation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_fix_suggestion: Option<String>,
}

impl Violation {
    /// Creates a new violation without confidence, code, or suggestion.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        file_path: impl Into<PathBuf>,
        line: usize,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            file_path: file_path.into(),
            line,
            message: message.into(),
            confidence: None,
            severity,
            code: None,
            auto_fix_suggestion: None,
        }
    }

    /// Sets the confidence of this violation.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Sets the stable code hash of this violation.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Adds a fix suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.auto_fix_suggestion = Some(suggestion.into());
        self
    }

    /// Returns the confidence, defaulting to [`DEFAULT_CONFIDENCE`].
    #[must_use]
    pub fn effective_confidence(&self) -> f64 {
        self.confidence.unwrap_or(DEFAULT_CONFIDENCE)
    }

    /// Returns the file path as a forward-slash string without a leading `./`.
    #[must_use]
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.file_path)
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} at {}:{}\n",
            self.rule,
            self.file_path.display(),
            self.line,
        );
        let _ = writeln!(
            output,
            "  {}: {} (confidence {:.2})",
            self.severity,
            self.message,
            self.effective_confidence()
        );
        if let Some(suggestion) = &self.auto_fix_suggestion {
            let _ = writeln!(output, "  = help: {suggestion}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {} ({:.2})",
            self.file_path.display(),
            self.line,
            self.severity,
            self.rule,
            self.message,
            self.effective_confidence(),
        )
    }
}

/// Normalizes a path for comparison: forward slashes, no leading `./`.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut trimmed = raw.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}

/// Outcome of running one validator.
///
/// `passed` is derived state: it always equals
/// `violations.is_empty() && error.is_none()` once any pass has called
/// [`ValidationResult::recompute_passed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Id of the validator that produced this result.
    pub validator: String,
    /// Whether the validator passed.
    pub passed: bool,
    /// Summary message.
    pub message: String,
    /// Violations found.
    pub violations: Vec<Violation>,
    /// Free-form details reported by the plugin.
    #[serde(default)]
    pub details: Vec<String>,
    /// Execution failure summary, set when the plugin errored or panicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    /// Creates a result from a set of violations.
    #[must_use]
    pub fn new(
        validator: impl Into<String>,
        message: impl Into<String>,
        violations: Vec<Violation>,
    ) -> Self {
        let mut result = Self {
            validator: validator.into(),
            passed: false,
            message: message.into(),
            violations,
            details: Vec::new(),
            error: None,
        };
        result.recompute_passed();
        result
    }

    /// Creates a failed result for a validator that could not execute.
    #[must_use]
    pub fn execution_failed(validator: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            validator: validator.into(),
            passed: false,
            message: format!("validator failed to execute: {error}"),
            violations: Vec::new(),
            details: Vec::new(),
            error: Some(error),
        }
    }

    /// Attaches details to this result.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Re-derives `passed` from the current violations.
    pub fn recompute_passed(&mut self) {
        self.passed = self.violations.is_empty() && self.error.is_none();
    }

    /// Keeps only the violations matching `keep` and re-derives `passed`.
    ///
    /// Returns the number of violations removed.
    pub fn retain_violations<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Violation) -> bool,
    {
        let before = self.violations.len();
        self.violations.retain(keep);
        self.recompute_passed();
        before - self.violations.len()
    }

    /// Returns true if the validator failed during execution.
    #[must_use]
    pub fn is_execution_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        count_by_severity(&self.violations)
    }
}

/// Counts violations by severity as `(errors, warnings, infos)`.
#[must_use]
pub fn count_by_severity<'a, I>(violations: I) -> (usize, usize, usize)
where
    I: IntoIterator<Item = &'a Violation>,
{
    violations
        .into_iter()
        .fold((0, 0, 0), |(e, w, i), v| match v.severity {
            Severity::Error => (e + 1, w, i),
            Severity::Warning => (e, w + 1, i),
            Severity::Info => (e, w, i + 1),
        })
}

/// Overall result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No result failed after overrides and confidence filtering.
    Success,
    /// At least one result failed.
    Failure {
        /// Ids of the failing validators, in result order.
        failed: Vec<String>,
    },
}

impl RunOutcome {
    /// Derives the outcome from the final result collection.
    #[must_use]
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let failed: Vec<String> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.validator.clone())
            .collect();
        if failed.is_empty() {
            Self::Success
        } else {
            Self::Failure { failed }
        }
    }

    /// Returns true for [`RunOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
