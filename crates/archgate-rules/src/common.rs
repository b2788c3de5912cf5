//! Helpers shared by the built-in plugins.

use archgate_core::{PluginError, ValidatorConfig};
use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

/// Name of the optional confidence parameter every built-in plugin accepts.
pub const CONFIDENCE: &str = "confidence";

/// Name of the optional message parameter.
pub const MESSAGE: &str = "message";

/// Stable code hash of a finding: the rule name and the trimmed source line.
///
/// The hash survives the line moving within the file but changes when the
/// line content does.
#[must_use]
pub fn code_hash(rule: &str, line: &str) -> String {
    let mut key = String::with_capacity(rule.len() + line.len() + 1);
    key.push_str(rule);
    key.push('\0');
    key.push_str(line.trim());
    format!("{:016x}", xxh3_64(key.as_bytes()))
}

/// Reads the `confidence` parameter.
///
/// # Errors
///
/// Returns an error if the value is not a number in `[0, 1]`.
#[allow(clippy::cast_precision_loss)]
pub fn confidence(config: &ValidatorConfig) -> Result<Option<f64>, PluginError> {
    let value = match config.params.get(CONFIDENCE) {
        None => return Ok(None),
        Some(toml::Value::Float(f)) => *f,
        Some(toml::Value::Integer(i)) => *i as f64,
        Some(other) => {
            return Err(PluginError::InvalidConfig(format!(
                "`confidence` must be a number, got {}",
                other.type_str()
            )))
        }
    };
    if (0.0..=1.0).contains(&value) {
        Ok(Some(value))
    } else {
        Err(PluginError::InvalidConfig(format!(
            "`confidence` must be within [0, 1], got {value}"
        )))
    }
}

/// Compiles a list of regular expressions, naming the parameter on failure.
///
/// # Errors
///
/// Returns an error on the first pattern that does not compile.
pub fn compile_all(param: &str, patterns: &[String]) -> Result<Vec<Regex>, PluginError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                PluginError::InvalidConfig(format!("`{param}` pattern `{p}` is invalid: {e}"))
            })
        })
        .collect()
}

/// Returns true for lines that are entirely a comment in C-like, shell, or
/// Python-style sources.
#[must_use]
pub fn is_comment_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*') || t.starts_with('#')
}
