//! Plugin that checks every defined item is registered somewhere central.
//!
//! Typical use: every handler module declares a route, and each route has
//! to appear in the router file; every plugin struct has to be added to
//! the registry.
//!
//! # Example
//!
//! ```toml
//! [[validators]]
//! id = "handlers-registered"
//! plugin = "registration-completeness"
//! files = ["src/handlers/*.ts"]
//! [validators.params]
//! definition = 'export\s+class\s+(\w+Handler)'
//! registry = "src/router.ts"
//! ```

use crate::common::{self, code_hash};
use archgate_core::{
    normalize_path, PluginError, PluginOutput, Severity, ValidatorConfig, ValidatorContext,
    ValidatorPlugin, Violation,
};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Plugin id.
pub const ID: &str = "registration-completeness";

const PARAMS: &[&str] = &["definition", "registry", common::MESSAGE, common::CONFIDENCE];

const DEFAULT_MESSAGE: &str = "`{name}` is defined but not registered in {registry}";

/// Reports definitions whose name never appears in the registry file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationCompleteness;

impl RegistrationCompleteness {
    /// Creates the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn definition_regex(config: &ValidatorConfig) -> Result<Regex, PluginError> {
    let raw = config.get_str("definition").ok_or_else(|| {
        PluginError::InvalidConfig("`definition` regex is required".to_string())
    })?;
    let re = Regex::new(raw).map_err(|e| {
        PluginError::InvalidConfig(format!("`definition` pattern `{raw}` is invalid: {e}"))
    })?;
    if re.captures_len() < 2 {
        return Err(PluginError::InvalidConfig(
            "`definition` needs a capture group for the item name".to_string(),
        ));
    }
    Ok(re)
}

fn registry_path(config: &ValidatorConfig) -> Result<&str, PluginError> {
    config
        .get_str("registry")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PluginError::InvalidConfig("`registry` file is required".to_string()))
}

impl ValidatorPlugin for RegistrationCompleteness {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Requires every defined item to be named in a registry file"
    }

    fn parameters(&self) -> &'static [&'static str] {
        PARAMS
    }

    fn validate_config(&self, config: &ValidatorConfig) -> Result<(), PluginError> {
        archgate_core::reject_unknown_params(PARAMS, config)?;
        definition_regex(config)?;
        registry_path(config)?;
        common::confidence(config)?;
        Ok(())
    }

    fn check(
        &self,
        ctx: &ValidatorContext<'_>,
        files: &[PathBuf],
    ) -> Result<PluginOutput, PluginError> {
        let config = ctx.config;
        let definition = definition_regex(config)?;
        let registry = registry_path(config)?;
        let template = config.get_str(common::MESSAGE).unwrap_or(DEFAULT_MESSAGE);
        let confidence = common::confidence(config)?;

        let registry_content = ctx.read(Path::new(registry))?;
        let registry_key = normalize_path(Path::new(registry));

        let mut out = PluginOutput::new();
        let mut defined = 0usize;
        for file in ctx.select(files) {
            if normalize_path(file) == registry_key {
                continue;
            }
            let Some(content) = ctx.read_text(file)? else {
                out = out.detail(format!("skipped {}: not UTF-8 text", file.display()));
                continue;
            };
            for (idx, line) in content.lines().enumerate() {
                for cap in definition.captures_iter(line) {
                    let Some(name) = cap.get(1).map(|m| m.as_str()) else {
                        continue;
                    };
                    defined += 1;
                    if is_registered(&registry_content, name) {
                        continue;
                    }
                    let message = template
                        .replace("{name}", name)
                        .replace("{registry}", registry);
                    let mut v =
                        Violation::new(ctx.id, file.clone(), idx + 1, Severity::Error, message)
                            .with_code(code_hash(ctx.id, line))
                            .with_suggestion(format!("register `{name}` in {registry}"));
                    if let Some(c) = confidence {
                        v = v.with_confidence(c);
                    }
                    out.violations.push(v);
                }
            }
        }

        Ok(out.detail(format!("{defined} definition(s) checked against {registry}")))
    }
}

/// Whole-word search so `UserHandler` does not count as registering `User`.
fn is_registered(registry: &str, name: &str) -> bool {
    registry.match_indices(name).any(|(start, _)| {
        let before = registry[..start].chars().next_back();
        let after = registry[start + name.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
