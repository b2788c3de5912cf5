//! Report model and renderers.
//!
//! [`Report`] is the single source of truth for a run. The JSON rendering
//! is canonical and round-trips losslessly; every human-readable rendering
//! is derived from the same `Report` value and never from the results
//! directly.

use crate::model::ConfidenceThreshold;
use crate::types::{count_by_severity, Severity, ValidationResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output format of a report artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Canonical machine-readable JSON.
    Json,
    /// Human-readable terminal text.
    Text,
    /// Markdown document.
    Markdown,
    /// One line per violation.
    Compact,
}

impl ReportFormat {
    /// All formats, canonical first.
    pub const ALL: [Self; 4] = [Self::Json, Self::Text, Self::Markdown, Self::Compact];

    /// Returns the renderer for this format. Text output is uncoloured.
    #[must_use]
    pub fn renderer(self) -> Box<dyn ReportRenderer> {
        match self {
            Self::Json => Box::new(JsonRenderer),
            Self::Text => Box::new(TextRenderer::plain()),
            Self::Markdown => Box::new(MarkdownRenderer),
            Self::Compact => Box::new(CompactRenderer),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
            Self::Markdown => write!(f, "markdown"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Errors producing or reading report artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A report document could not be parsed.
    #[error("failed to parse report: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// An artifact could not be written.
    #[error("failed to write report {path}: {source}")]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Facts about the run that produced a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Version of the tool that produced the report.
    pub tool_version: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of candidate files handed to the validators.
    pub files_analyzed: usize,
    /// Confidence threshold applied, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    /// Ids of the validators that ran, in run order.
    #[serde(default)]
    pub validators_run: Vec<String>,
    /// Profile the validators came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl RunMetadata {
    /// Creates metadata stamped with this crate's version and the current time.
    #[must_use]
    pub fn new(files_analyzed: usize) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            files_analyzed,
            confidence_threshold: None,
            validators_run: Vec::new(),
            profile: None,
        }
    }

    /// Records the applied threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Option<ConfidenceThreshold>) -> Self {
        self.confidence_threshold = threshold.map(ConfidenceThreshold::value);
        self
    }

    /// Records the profile name.
    #[must_use]
    pub fn with_profile(mut self, profile: Option<&str>) -> Self {
        self.profile = profile.map(str::to_string);
        self
    }

    /// Records the validators that ran.
    #[must_use]
    pub fn with_validators(mut self, ids: Vec<String>) -> Self {
        self.validators_run = ids;
        self
    }
}

/// Aggregate counts over the final results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of results.
    pub total_results: usize,
    /// Results that passed.
    pub passed_results: usize,
    /// Results that failed.
    pub failed_results: usize,
    /// Violations across all results.
    pub total_violations: usize,
    /// Error-severity violations.
    pub errors: usize,
    /// Warning-severity violations.
    pub warnings: usize,
    /// Info-severity violations.
    pub infos: usize,
}

impl Summary {
    /// Computes the summary of a result collection.
    #[must_use]
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        let (errors, warnings, infos) =
            count_by_severity(results.iter().flat_map(|r| r.violations.iter()));
        Self {
            total_results: results.len(),
            passed_results: passed,
            failed_results: results.len() - passed,
            total_violations: errors + warnings + infos,
            errors,
            warnings,
            infos,
        }
    }
}

/// Final output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata.
    pub metadata: RunMetadata,
    /// Aggregate counts.
    pub summary: Summary,
    /// Final results in validator run order.
    pub results: Vec<ValidationResult>,
}

impl Report {
    /// Builds a report from the final results.
    #[must_use]
    pub fn build(results: Vec<ValidationResult>, metadata: RunMetadata) -> Self {
        Self {
            summary: Summary::from_results(&results),
            metadata,
            results,
        }
    }

    /// Returns true if every result passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.summary.failed_results == 0
    }

    /// Serializes the canonical JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses the canonical JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid report.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|e| ReportError::Parse {
            message: e.to_string(),
        })
    }

    /// Reads a canonical JSON report from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

/// Renders a [`Report`] into one output format.
pub trait ReportRenderer {
    /// The format this renderer produces.
    fn format(&self) -> ReportFormat;

    /// File name used when the rendering is written to a report directory.
    fn file_name(&self) -> &'static str;

    /// Renders the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be rendered.
    fn render(&self, report: &Report) -> Result<String, ReportError>;
}

/// Canonical JSON rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn file_name(&self) -> &'static str {
        "report.json"
    }

    fn render(&self, report: &Report) -> Result<String, ReportError> {
        let mut json = report.to_json()?;
        json.push('\n');
        Ok(json)
    }
}

/// Terminal rendering with optional ANSI colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    /// Creates a renderer that emits ANSI colour codes.
    #[must_use]
    pub fn colored() -> Self {
        Self { color: true }
    }

    /// Creates a renderer without colour codes.
    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn severity(&self, severity: Severity) -> String {
        match severity {
            Severity::Error => self.paint("31", "error"),
            Severity::Warning => self.paint("33", "warning"),
            Severity::Info => self.paint("34", "info"),
        }
    }
}

impl ReportRenderer for TextRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Text
    }

    fn file_name(&self) -> &'static str {
        "report.txt"
    }

    fn render(&self, report: &Report) -> Result<String, ReportError> {
        let mut out = String::new();
        for result in &report.results {
            let tag = if result.is_execution_failure() {
                self.paint("35", "ERROR")
            } else if result.passed {
                self.paint("32", "PASS")
            } else {
                self.paint("31", "FAIL")
            };
            let _ = writeln!(out, "{tag} {}: {}", result.validator, result.message);

            for v in &result.violations {
                let _ = writeln!(
                    out,
                    "  {}:{}: {} [{}] {} (confidence {:.2})",
                    v.file_path.display(),
                    v.line,
                    self.severity(v.severity),
                    v.rule,
                    v.message,
                    v.effective_confidence(),
                );
                if let Some(suggestion) = &v.auto_fix_suggestion {
                    let _ = writeln!(out, "    = help: {suggestion}");
                }
            }
            for detail in &result.details {
                let _ = writeln!(out, "  - {detail}");
            }
        }

        let s = &report.summary;
        let color = if s.errors > 0 || s.failed_results > 0 {
            "31"
        } else if s.warnings > 0 {
            "33"
        } else {
            "32"
        };
        if !report.results.is_empty() {
            out.push('\n');
        }
        let line = format!(
            "{}/{} validator(s) passed; {} error(s), {} warning(s), {} info(s) in {} file(s)",
            s.passed_results,
            s.total_results,
            s.errors,
            s.warnings,
            s.infos,
            report.metadata.files_analyzed,
        );
        let _ = writeln!(out, "{}", self.paint(color, &line));
        Ok(out)
    }
}

/// Markdown document rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

fn md_escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl ReportRenderer for MarkdownRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }

    fn file_name(&self) -> &'static str {
        "report.md"
    }

    fn render(&self, report: &Report) -> Result<String, ReportError> {
        let m = &report.metadata;
        let s = &report.summary;
        let mut out = String::from("# Architecture Compliance Report\n\n");

        let _ = writeln!(
            out,
            "- Generated: {}",
            m.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let _ = writeln!(out, "- Tool version: {}", m.tool_version);
        let _ = writeln!(out, "- Files analyzed: {}", m.files_analyzed);
        if let Some(profile) = &m.profile {
            let _ = writeln!(out, "- Profile: `{profile}`");
        }
        if let Some(t) = m.confidence_threshold {
            let _ = writeln!(out, "- Confidence threshold: {t}");
        }
        let verdict = if report.is_success() { "PASSED" } else { "FAILED" };
        let _ = writeln!(out, "- Result: **{verdict}**");

        out.push_str("\n## Summary\n\n");
        out.push_str("| Validators | Passed | Failed | Violations | Errors | Warnings | Info |\n");
        out.push_str("|---|---|---|---|---|---|---|\n");
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            s.total_results,
            s.passed_results,
            s.failed_results,
            s.total_violations,
            s.errors,
            s.warnings,
            s.infos
        );

        if !report.results.is_empty() {
            out.push_str("\n## Results\n");
        }
        for result in &report.results {
            let status = if result.is_execution_failure() {
                "error"
            } else if result.passed {
                "passed"
            } else {
                "failed"
            };
            let _ = write!(
                out,
                "\n### `{}` ({status})\n\n{}\n",
                result.validator,
                md_escape(&result.message)
            );
            if !result.violations.is_empty() {
                out.push_str("\n| File | Line | Severity | Rule | Message | Confidence |\n");
                out.push_str("|---|---|---|---|---|---|\n");
                for v in &result.violations {
                    let _ = writeln!(
                        out,
                        "| `{}` | {} | {} | {} | {} | {:.2} |",
                        v.normalized_path(),
                        v.line,
                        v.severity,
                        v.rule,
                        md_escape(&v.message),
                        v.effective_confidence()
                    );
                }
            }
            if !result.details.is_empty() {
                out.push('\n');
                for detail in &result.details {
                    let _ = writeln!(out, "- {}", md_escape(detail));
                }
            }
        }
        Ok(out)
    }
}

/// One line per violation, suitable for editors and grep.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactRenderer;

impl ReportRenderer for CompactRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Compact
    }

    fn file_name(&self) -> &'static str {
        "report-compact.txt"
    }

    fn render(&self, report: &Report) -> Result<String, ReportError> {
        let mut out = String::new();
        for result in &report.results {
            if let Some(error) = &result.error {
                let _ = writeln!(out, "{}: execution failed: {error}", result.validator);
            }
            for v in &result.violations {
                let _ = writeln!(out, "{v}");
            }
        }
        Ok(out)
    }
}

/// Writes report artifacts to a directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer targeting `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the canonical JSON artifact followed by each other requested
    /// format, returning the paths written in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an artifact
    /// cannot be rendered or written.
    pub fn write(
        &self,
        report: &Report,
        formats: &[ReportFormat],
    ) -> Result<Vec<PathBuf>, ReportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ReportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut order = vec![ReportFormat::Json];
        for format in formats {
            if !order.contains(format) {
                order.push(*format);
            }
        }

        let mut written = Vec::with_capacity(order.len());
        for format in order {
            let renderer = format.renderer();
            let path = self.dir.join(renderer.file_name());
            let content = renderer.render(report)?;
            std::fs::write(&path, content).map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("Wrote {} report to {}", format, path.display());
            written.push(path);
        }
        info!("Wrote {} report artifact(s) to {}", written.len(), self.dir.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Violation;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_report() -> Report {
        let results = vec![
            ValidationResult::new(
                "no-eval",
                "2 violation(s) found",
                vec![
                    Violation::new("no-eval", "src/a.js", 3, Severity::Error, "eval() detected")
                        .with_confidence(0.9)
                        .with_code("c0ffee")
                        .with_suggestion("use JSON.parse"),
                    Violation::new("no-eval", "src/b.js", 7, Severity::Warning, "new Function")
                        .with_confidence(0.75),
                ],
            ),
            ValidationResult::new("file-naming", "passed", vec![]),
            ValidationResult::execution_failed("secrets-scan", "plugin panicked: boom"),
        ];
        let metadata = RunMetadata {
            tool_version: "0.1.0".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
            files_analyzed: 12,
            confidence_threshold: Some(0.7),
            validators_run: vec![
                "no-eval".to_string(),
                "file-naming".to_string(),
                "secrets-scan".to_string(),
            ],
            profile: Some("security".to_string()),
        };
        Report::build(results, metadata)
    }

    #[test]
    fn summary_counts() {
        let report = sample_report();
        let s = report.summary;
        assert_eq!(s.total_results, 3);
        assert_eq!(s.passed_results, 1);
        assert_eq!(s.failed_results, 2);
        assert_eq!(s.total_violations, 2);
        assert_eq!((s.errors, s.warnings, s.infos), (1, 1, 0));
        assert!(!report.is_success());
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let report = sample_report();
        let json = report.to_json().unwrap();
        let parsed = Report::from_json(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(json.contains("\"auto_fix_suggestion\": \"use JSON.parse\""));
        assert!(json.contains("\"severity\": \"error\""));
    }

    #[test]
    fn json_round_trip_preserves_confidence_bits() {
        let mut state = 0x9e37_79b9_7f4a_7c15_u64;
        let mut values = vec![0.985_690_694_632_869_5, 0.1 + 0.2, 1.0 - f64::EPSILON];
        for _ in 0..2000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            #[allow(clippy::cast_precision_loss)]
            values.push((state >> 11) as f64 / (1u64 << 53) as f64);
        }

        let violations = values
            .iter()
            .map(|&c| Violation::new("r", "a.js", 1, Severity::Info, "m").with_confidence(c))
            .collect();
        let metadata = RunMetadata {
            confidence_threshold: Some(0.985_690_694_632_869_5),
            ..sample_report().metadata
        };
        let report = Report::build(vec![ValidationResult::new("r", "", violations)], metadata);

        let parsed = Report::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(
            parsed.metadata.confidence_threshold.map(f64::to_bits),
            Some(0.985_690_694_632_869_5_f64.to_bits())
        );
        assert_eq!(parsed.results[0].violations.len(), values.len());
        for (v, expected) in parsed.results[0].violations.iter().zip(&values) {
            assert_eq!(v.confidence.map(f64::to_bits), Some(expected.to_bits()));
        }
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            Report::from_json("[]"),
            Err(ReportError::Parse { .. })
        ));
    }

    #[test]
    fn compact_rendering() {
        let out = CompactRenderer.render(&sample_report()).unwrap();
        insta::assert_snapshot!(out, @r"
        src/a.js:3: error [no-eval] eval() detected (0.90)
        src/b.js:7: warning [no-eval] new Function (0.75)
        secrets-scan: execution failed: plugin panicked: boom
        ");
    }

    #[test]
    fn text_rendering_marks_each_result() {
        let out = TextRenderer::plain().render(&sample_report()).unwrap();
        assert!(out.contains("FAIL no-eval: 2 violation(s) found"));
        assert!(out.contains("PASS file-naming: passed"));
        assert!(out.contains("ERROR secrets-scan: validator failed to execute"));
        assert!(out.contains("= help: use JSON.parse"));
        assert!(out.contains("1/3 validator(s) passed; 1 error(s), 1 warning(s), 0 info(s) in 12 file(s)"));
        assert!(!out.contains('\x1b'));

        let colored = TextRenderer::colored().render(&sample_report()).unwrap();
        assert!(colored.contains("\x1b[31m"));
    }

    #[test]
    fn markdown_rendering() {
        let out = MarkdownRenderer.render(&sample_report()).unwrap();
        assert!(out.starts_with("# Architecture Compliance Report\n"));
        assert!(out.contains("- Generated: 2026-10-19T08:30:00Z"));
        assert!(out.contains("- Profile: `security`"));
        assert!(out.contains("- Result: **FAILED**"));
        assert!(out.contains("| 3 | 1 | 2 | 2 | 1 | 1 | 0 |"));
        assert!(out.contains("### `secrets-scan` (error)"));
        assert!(out.contains("| `src/a.js` | 3 | error | no-eval | eval() detected | 0.90 |"));
    }

    #[test]
    fn markdown_escapes_pipes() {
        assert_eq!(md_escape("a | b\nc"), "a \\| b c");
    }

    #[test]
    fn writer_emits_json_first_and_dedups() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path().join("out"));
        let written = writer
            .write(
                &sample_report(),
                &[ReportFormat::Markdown, ReportFormat::Json, ReportFormat::Markdown],
            )
            .unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["report.json", "report.md"]);

        let reread = Report::from_file(&written[0]).unwrap();
        assert_eq!(reread, sample_report());
    }

    #[test]
    fn writer_reports_io_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let writer = ReportWriter::new(blocker.join("nested"));
        let err = writer.write(&sample_report(), &[]).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn format_serde_names() {
        let formats: Vec<ReportFormat> =
            serde_json::from_str(r#"["json","text","markdown","compact"]"#).unwrap();
        assert_eq!(formats, ReportFormat::ALL.to_vec());
    }
}
