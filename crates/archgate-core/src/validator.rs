//! Validator and profile definitions.

use crate::model::{GlobPattern, Id};
use crate::plugin::ValidatorPlugin;
use crate::types::Severity;
use std::path::Path;
use std::sync::Arc;

/// Validator-specific configuration: file pattern, severity, rule parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorConfig {
    /// Files this validator targets. Empty means every candidate file.
    pub files: Vec<GlobPattern>,
    /// Files this validator skips even when `files` matches.
    pub exclude: Vec<GlobPattern>,
    /// Severity forced onto every violation this validator reports.
    pub severity: Option<Severity>,
    /// Plugin parameters.
    pub params: toml::Table,
}

impl ValidatorConfig {
    /// Returns true if this validator targets `path`.
    #[must_use]
    pub fn targets(&self, path: &Path) -> bool {
        let included = self.files.is_empty() || self.files.iter().any(|p| p.matches(path));
        included && !self.exclude.iter().any(|p| p.matches(path))
    }

    /// Gets a parameter value as a specific type.
    #[must_use]
    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.params.get(key).and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean parameter with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.params
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets a float parameter with a default value. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.params.get(key) {
            Some(toml::Value::Float(f)) => *f,
            Some(toml::Value::Integer(i)) => *i as f64,
            _ => default,
        }
    }

    /// Gets a string parameter.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(toml::Value::as_str)
    }

    /// Gets a string array parameter. A single string is treated as one element.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        match self.params.get(key) {
            Some(toml::Value::String(s)) => vec![s.clone()],
            Some(toml::Value::Array(arr)) => arr
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A validator definition as written in project configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorDef {
    /// Unique validator id.
    pub id: Id,
    /// Display name.
    pub name: String,
    /// Free-form category (e.g., "import", "naming").
    pub kind: String,
    /// Registry id of the plugin that runs this validator.
    pub plugin: Id,
    /// Validator configuration.
    pub config: ValidatorConfig,
}

impl ValidatorDef {
    /// Creates a definition with the default configuration for a plugin.
    #[must_use]
    pub fn for_plugin(id: Id, plugin: Id) -> Self {
        Self {
            name: id.as_str().to_string(),
            kind: plugin.as_str().to_string(),
            id,
            plugin,
            config: ValidatorConfig::default(),
        }
    }
}

/// A loaded validator: a definition bound to its plugin.
///
/// Immutable once constructed; one instance exists per run.
#[derive(Clone)]
pub struct Validator {
    def: Arc<ValidatorDef>,
    plugin: Arc<dyn ValidatorPlugin>,
}

impl Validator {
    /// Binds a definition to a plugin.
    #[must_use]
    pub fn new(def: ValidatorDef, plugin: Arc<dyn ValidatorPlugin>) -> Self {
        Self {
            def: Arc::new(def),
            plugin,
        }
    }

    /// Returns the validator id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.def.id.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the definition.
    #[must_use]
    pub fn def(&self) -> &ValidatorDef {
        &self.def
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.def.config
    }

    /// Returns the bound plugin.
    #[must_use]
    pub fn plugin(&self) -> &dyn ValidatorPlugin {
        self.plugin.as_ref()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("id", &self.def.id)
            .field("plugin", &self.plugin.id())
            .finish()
    }
}

/// One entry of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// Referenced validator id.
    pub id: String,
    /// Whether the validator is included when the profile is loaded.
    pub enabled: bool,
}

/// A named, ordered set of validators run together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Profile name.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Entries in run order.
    pub entries: Vec<ProfileEntry>,
}

impl Profile {
    /// Returns the ids of enabled entries, in order.
    #[must_use]
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.id.as_str())
            .collect()
    }
}
