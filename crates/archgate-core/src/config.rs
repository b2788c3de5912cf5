//! Project configuration (`archgate.toml`).
//!
//! Validator definitions are kept in their raw form here and validated by
//! the [`crate::ValidatorLoader`] when they are requested, so a bad
//! definition only fails the run that asks for it.

use crate::model::ConfidenceThreshold;
use crate::overrides::MatchStrictness;
use crate::report::ReportFormat;
use crate::validator::{Profile, ProfileEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default location of the persisted override file.
pub const DEFAULT_OVERRIDE_PATH: &str = ".archgate/overrides.json";

/// Default output directory for report artifacts.
pub const DEFAULT_REPORT_DIR: &str = "archgate-report";

/// Top-level configuration for archgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Profile used when a run names neither validators nor a profile.
    #[serde(default)]
    pub default_profile: Option<String>,

    /// Execution engine settings.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Override store settings.
    #[serde(default)]
    pub overrides: OverrideSettings,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportSettings,

    /// Candidate file selection settings.
    #[serde(default)]
    pub selector: SelectorSettings,

    /// Validator definitions.
    #[serde(default)]
    pub validators: Vec<ValidatorDefDto>,

    /// Named profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileDto>,
}

impl ProjectConfig {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a setting is out of range.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.engine.confidence_threshold {
            ConfidenceThreshold::new(t).map_err(|e| ConfigError::Invalid {
                field: "engine.confidence_threshold".to_string(),
                message: e.to_string(),
            })?;
        }
        if self.engine.parallelism == Some(0) {
            return Err(ConfigError::Invalid {
                field: "engine.parallelism".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(name) = &self.default_profile {
            if !self.profiles.contains_key(name) {
                return Err(ConfigError::Invalid {
                    field: "default_profile".to_string(),
                    message: format!("profile `{name}` is not defined"),
                });
            }
        }
        Ok(())
    }

    /// Returns the configured confidence threshold, if any.
    #[must_use]
    pub fn confidence_threshold(&self) -> Option<ConfidenceThreshold> {
        self.engine
            .confidence_threshold
            .and_then(|t| ConfidenceThreshold::new(t).ok())
    }

    /// Finds a raw validator definition by id.
    #[must_use]
    pub fn validator(&self, id: &str) -> Option<&ValidatorDefDto> {
        self.validators.iter().find(|v| v.id == id)
    }

    /// Resolves a profile by name.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<Profile> {
        self.profiles.get(name).map(|dto| dto.to_profile(name))
    }
}

/// Execution engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Maximum number of validators run concurrently (default: CPU count).
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Violations below this confidence are dropped (default: keep all).
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
}

/// Override store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideSettings {
    /// Path of the persisted override file, relative to the project root.
    #[serde(default = "default_override_path")]
    pub path: PathBuf,

    /// How precisely overrides are matched against violations.
    #[serde(default, rename = "match")]
    pub strictness: MatchStrictness,
}

impl Default for OverrideSettings {
    fn default() -> Self {
        Self {
            path: default_override_path(),
            strictness: MatchStrictness::default(),
        }
    }
}

fn default_override_path() -> PathBuf {
    PathBuf::from(DEFAULT_OVERRIDE_PATH)
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Directory report artifacts are written to.
    #[serde(default = "default_report_dir")]
    pub dir: PathBuf,

    /// Artifact formats to write; JSON is always included.
    #[serde(default = "default_report_formats")]
    pub formats: Vec<ReportFormat>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            dir: default_report_dir(),
            formats: default_report_formats(),
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_DIR)
}

fn default_report_formats() -> Vec<ReportFormat> {
    vec![ReportFormat::Json, ReportFormat::Markdown]
}

/// Candidate file selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSettings {
    /// Glob patterns to include (if empty, every file).
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns to exclude.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// Whether to respect `.gitignore` files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: default_excludes(),
            respect_gitignore: true,
        }
    }
}

fn default_excludes() -> Vec<String> {
    vec![
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/.git/**".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Raw validator definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorDefDto {
    /// Validator id.
    pub id: String,
    /// Display name (default: the id).
    #[serde(default)]
    pub name: Option<String>,
    /// Category label.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Plugin id (default: the validator id).
    #[serde(default)]
    pub plugin: Option<String>,
    /// Glob patterns of files this validator targets.
    #[serde(default)]
    pub files: Vec<String>,
    /// Glob patterns of files this validator skips.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Severity forced onto every violation.
    #[serde(default)]
    pub severity: Option<String>,
    /// Plugin parameters.
    #[serde(default)]
    pub params: toml::Table,
}

/// Raw profile definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDto {
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Validator entries in run order.
    #[serde(default)]
    pub validators: Vec<ProfileEntryDto>,
}

impl ProfileDto {
    fn to_profile(&self, name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            description: self.description.clone(),
            entries: self
                .validators
                .iter()
                .map(|e| match e {
                    ProfileEntryDto::Id(id) => ProfileEntry {
                        id: id.clone(),
                        enabled: true,
                    },
                    ProfileEntryDto::Entry { id, enabled } => ProfileEntry {
                        id: id.clone(),
                        enabled: *enabled,
                    },
                })
                .collect(),
        }
    }
}

/// A profile entry: a bare id or a table with inclusion metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileEntryDto {
    /// Bare validator id.
    Id(String),
    /// Validator id with inclusion flag.
    Entry {
        /// Validator id.
        id: String,
        /// Whether the validator is included.
        #[serde(default = "default_true")]
        enabled: bool,
    },
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A setting has an invalid value.
    #[error("Invalid config value for `{field}`: {message}")]
    Invalid {
        /// Dotted path of the setting.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}
