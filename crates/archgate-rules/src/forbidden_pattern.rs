//! Plugin that forbids regex patterns in source text.
//!
//! # Parameters
//!
//! | Name | Type | Default |
//! |------|------|---------|
//! | `patterns` | string or array of regexes | required |
//! | `message` | string, `{pattern}` and `{match}` are substituted | `forbidden pattern`... |
//! | `confidence` | number in `[0, 1]` | absent |
//! | `suggestion` | string | absent |
//! | `skip_comments` | bool | `true` |
//!
//! # Example
//!
//! ```toml
//! [[validators]]
//! id = "no-eval"
//! plugin = "forbidden-pattern"
//! files = ["src/**/*.js"]
//! [validators.params]
//! patterns = ['\beval\s*\(']
//! suggestion = "parse the input with JSON.parse instead"
//! ```

use crate::common::{self, code_hash, compile_all, is_comment_line};
use archgate_core::{
    PluginError, PluginOutput, Severity, ValidatorConfig, ValidatorContext, ValidatorPlugin,
    Violation,
};
use std::path::PathBuf;
use tracing::trace;

/// Plugin id.
pub const ID: &str = "forbidden-pattern";

const PARAMS: &[&str] = &[
    "patterns",
    common::MESSAGE,
    common::CONFIDENCE,
    "suggestion",
    "skip_comments",
];

const DEFAULT_MESSAGE: &str = "forbidden pattern `{pattern}` matched";

/// Reports every line matching one of the configured patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForbiddenPattern;

impl ForbiddenPattern {
    /// Creates the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ValidatorPlugin for ForbiddenPattern {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Forbids lines matching configured regular expressions"
    }

    fn parameters(&self) -> &'static [&'static str] {
        PARAMS
    }

    fn validate_config(&self, config: &ValidatorConfig) -> Result<(), PluginError> {
        archgate_core::reject_unknown_params(PARAMS, config)?;
        let patterns = config.get_str_array("patterns");
        if patterns.is_empty() {
            return Err(PluginError::InvalidConfig(
                "`patterns` must list at least one regex".to_string(),
            ));
        }
        compile_all("patterns", &patterns)?;
        common::confidence(config)?;
        Ok(())
    }

    fn check(
        &self,
        ctx: &ValidatorContext<'_>,
        files: &[PathBuf],
    ) -> Result<PluginOutput, PluginError> {
        let config = ctx.config;
        let raw = config.get_str_array("patterns");
        let patterns = compile_all("patterns", &raw)?;
        let template = config.get_str(common::MESSAGE).unwrap_or(DEFAULT_MESSAGE);
        let confidence = common::confidence(config)?;
        let suggestion = config.get_str("suggestion");
        let skip_comments = config.get_bool("skip_comments", true);

        let mut violations = Vec::new();
        let mut scanned = 0usize;
        let mut binary = 0usize;
        for file in ctx.select(files) {
            let Some(content) = ctx.read_text(file)? else {
                binary += 1;
                continue;
            };
            scanned += 1;
            for (idx, line) in content.lines().enumerate() {
                if skip_comments && is_comment_line(line) {
                    continue;
                }
                let Some((pattern, found)) = raw
                    .iter()
                    .zip(&patterns)
                    .find_map(|(p, re)| re.find(line).map(|m| (p, m.as_str())))
                else {
                    continue;
                };
                trace!("{}:{} matches `{}`", file.display(), idx + 1, pattern);

                let message = template
                    .replace("{pattern}", pattern)
                    .replace("{match}", found);
                let mut v = Violation::new(ctx.id, file.clone(), idx + 1, Severity::Error, message)
                    .with_code(code_hash(ctx.id, line));
                if let Some(c) = confidence {
                    v = v.with_confidence(c);
                }
                if let Some(s) = suggestion {
                    v = v.with_suggestion(s);
                }
                violations.push(v);
            }
        }

        let mut out = PluginOutput::with_violations(violations).detail(format!("{scanned} file(s) scanned"));
        if binary > 0 {
            out = out.detail(format!("{binary} non-text file(s) skipped"));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(params: &str) -> ValidatorConfig {
        ValidatorConfig {
            params: toml::from_str(params).unwrap(),
            ..ValidatorConfig::default()
        }
    }

    fn project(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for (rel, content) in files {
            let full = dir.path().join(rel);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
            paths.push(PathBuf::from(rel));
        }
        (dir, paths)
    }

    #[test]
    fn reports_matching_lines() {
        let (dir, files) = project(&[
            ("src/a.js", "const a = 1;\nconst b = eval(input);\n// eval(commented)\n"),
            ("src/b.js", "run();\n"),
        ]);
        let config = config(
            r#"
patterns = ['\beval\s*\(']
confidence = 0.9
suggestion = "use JSON.parse"
"#,
        );
        let ctx = ValidatorContext::new("no-eval", &config, dir.path());
        let out = ForbiddenPattern.check(&ctx, &files).unwrap();

        assert_eq!(out.violations.len(), 1);
        let v = &out.violations[0];
        assert_eq!(v.rule, "no-eval");
        assert_eq!(v.file_path, PathBuf::from("src/a.js"));
        assert_eq!(v.line, 2);
        assert_eq!(v.confidence, Some(0.9));
        assert_eq!(v.auto_fix_suggestion.as_deref(), Some("use JSON.parse"));
        assert_eq!(v.code.as_deref(), Some(code_hash("no-eval", "const b = eval(input);").as_str()));
        assert_eq!(out.details, vec!["2 file(s) scanned"]);
    }

    #[test]
    fn comments_can_be_included() {
        let (dir, files) = project(&[("a.sh", "# TODO remove\n")]);
        let config = config("patterns = 'TODO'\nskip_comments = false\nmessage = 'found {match}'");
        let ctx = ValidatorContext::new("todo", &config, dir.path());
        let out = ForbiddenPattern.check(&ctx, &files).unwrap();

        assert_eq!(out.violations.len(), 1);
        assert_eq!(out.violations[0].message, "found TODO");
    }

    #[test]
    fn code_survives_line_moves() {
        let config = config("patterns = ['eval']");
        let (dir, files) = project(&[("a.js", "eval(x);\n")]);
        let ctx = ValidatorContext::new("no-eval", &config, dir.path());
        let before = ForbiddenPattern.check(&ctx, &files).unwrap();

        std::fs::write(dir.path().join("a.js"), "\n\n    eval(x);\n").unwrap();
        let after = ForbiddenPattern.check(&ctx, &files).unwrap();

        assert_eq!(before.violations[0].code, after.violations[0].code);
        assert_ne!(before.violations[0].line, after.violations[0].line);
    }

    #[test]
    fn validate_config_rejects_bad_input() {
        let p = ForbiddenPattern;
        assert!(p.validate_config(&config("")).is_err());
        assert!(p.validate_config(&config("patterns = ['(']")).is_err());
        assert!(p.validate_config(&config("patterns = ['x']\nconfidence = 2.0")).is_err());
        assert!(p.validate_config(&config("patterns = ['x']\ncolour = 'red'")).is_err());
        assert!(p.validate_config(&config("patterns = ['x']")).is_ok());
    }

    #[test]
    fn unreadable_file_fails_the_run() {
        let dir = TempDir::new().unwrap();
        let config = config("patterns = ['x']");
        let ctx = ValidatorContext::new("x", &config, dir.path());
        let err = ForbiddenPattern
            .check(&ctx, &[PathBuf::from("missing.js")])
            .unwrap_err();
        assert!(matches!(err, PluginError::Io { .. }));
    }

    #[test]
    fn binary_files_are_skipped_without_losing_findings() {
        let (dir, mut files) = project(&[("src/a.js", "eval(x);\n")]);
        std::fs::write(dir.path().join("src/logo.png"), [0x89, b'P', b'N', b'G', 0xff, 0x00]).unwrap();
        files.push(PathBuf::from("src/logo.png"));

        let config = config("patterns = ['eval']");
        let ctx = ValidatorContext::new("no-eval", &config, dir.path());
        let out = ForbiddenPattern.check(&ctx, &files).unwrap();

        assert_eq!(out.violations.len(), 1);
        assert_eq!(out.violations[0].file_path, PathBuf::from("src/a.js"));
        assert_eq!(
            out.details,
            vec!["1 file(s) scanned", "1 non-text file(s) skipped"]
        );
    }
}
