//! Resolves validator requests into loaded [`Validator`] instances.

use crate::config::{ProjectConfig, ValidatorDefDto};
use crate::model::{GlobPattern, Id, ModelError};
use crate::registry::PluginRegistry;
use crate::types::Severity;
use crate::validator::{Validator, ValidatorConfig, ValidatorDef};
use miette::Diagnostic;
use std::collections::HashSet;
use tracing::debug;

/// Errors raised while resolving validators. All of them are fatal for the
/// run and surface before any validator executes.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum LoadError {
    /// The requested profile is not defined.
    #[error("profile `{name}` not found")]
    #[diagnostic(
        code(archgate::profile_not_found),
        help("define it under [profiles.{name}] in archgate.toml")
    )]
    ProfileNotFound {
        /// The requested profile name.
        name: String,
    },

    /// The requested validator id resolves to neither a definition nor a plugin.
    #[error("validator `{id}` not found")]
    #[diagnostic(
        code(archgate::validator_not_found),
        help("add a [[validators]] entry or use a registered plugin id")
    )]
    ValidatorNotFound {
        /// The requested validator id.
        id: String,
    },

    /// The validator definition failed validation.
    #[error("validator `{id}` has invalid configuration: {reason}")]
    #[diagnostic(code(archgate::validator_config))]
    ValidatorConfig {
        /// The validator id.
        id: String,
        /// What is wrong with the definition.
        reason: String,
    },

    /// Several validators failed to load.
    #[error("{} validator(s) failed to load:\n{}", .0.len(), format_errors(.0))]
    #[diagnostic(code(archgate::batch_load))]
    Batch(#[related] Vec<LoadError>),
}

impl LoadError {
    /// Returns the individual failures, flattening batches.
    #[must_use]
    pub fn failures(&self) -> Vec<&LoadError> {
        match self {
            Self::Batch(errors) => errors.iter().flat_map(LoadError::failures).collect(),
            other => vec![other],
        }
    }

    /// Returns the ids of validators that failed to resolve or validate.
    #[must_use]
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures()
            .into_iter()
            .filter_map(|e| match e {
                Self::ValidatorNotFound { id } | Self::ValidatorConfig { id, .. } => {
                    Some(id.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

fn format_errors(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// What a run asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorRequest {
    /// A single validator id.
    Single(String),
    /// An explicit list of validator ids.
    List(Vec<String>),
    /// A named profile.
    Profile(String),
}

impl ValidatorRequest {
    /// Short label for run metadata.
    #[must_use]
    pub fn profile_name(&self) -> Option<&str> {
        match self {
            Self::Profile(name) => Some(name),
            _ => None,
        }
    }
}

/// Resolves validator ids and profiles against project configuration and
/// the plugin registry.
///
/// Reads definitions only; performs no file-content I/O.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorLoader<'a> {
    config: &'a ProjectConfig,
    registry: &'a PluginRegistry,
}

impl<'a> ValidatorLoader<'a> {
    /// Creates a loader.
    #[must_use]
    pub fn new(config: &'a ProjectConfig, registry: &'a PluginRegistry) -> Self {
        Self { config, registry }
    }

    /// Loads whatever the request names.
    ///
    /// # Errors
    ///
    /// See [`Self::load_validator`], [`Self::load_validators`], and
    /// [`Self::load_profile`].
    pub fn load(&self, request: &ValidatorRequest) -> Result<Vec<Validator>, LoadError> {
        match request {
            ValidatorRequest::Single(id) => self.load_validator(id).map(|v| vec![v]),
            ValidatorRequest::List(ids) => self.load_validators(ids),
            ValidatorRequest::Profile(name) => self.load_profile(name),
        }
    }

    /// Loads every enabled validator of a profile, all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProfileNotFound`] for an unknown profile, or the
    /// aggregated failures of its validators.
    pub fn load_profile(&self, name: &str) -> Result<Vec<Validator>, LoadError> {
        let profile = self
            .config
            .profile(name)
            .ok_or_else(|| LoadError::ProfileNotFound {
                name: name.to_string(),
            })?;
        debug!(
            "Loading profile `{}` ({} entries)",
            name,
            profile.entries.len()
        );
        self.load_validators(&profile.enabled_ids())
    }

    /// Loads a single validator.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ValidatorNotFound`] if the id is unknown, or
    /// [`LoadError::ValidatorConfig`] if its definition is invalid.
    pub fn load_validator(&self, id: &str) -> Result<Validator, LoadError> {
        let def = match self.config.validator(id) {
            Some(dto) => convert_def(dto)?,
            None if self.registry.contains(id) => {
                let id = Id::new(id).map_err(|e| config_error(id, &e))?;
                ValidatorDef::for_plugin(id.clone(), id)
            }
            None => {
                return Err(LoadError::ValidatorNotFound { id: id.to_string() });
            }
        };

        let plugin =
            self.registry
                .get(def.plugin.as_str())
                .ok_or_else(|| LoadError::ValidatorConfig {
                    id: id.to_string(),
                    reason: format!("unknown plugin `{}`", def.plugin),
                })?;

        plugin
            .validate_config(&def.config)
            .map_err(|e| LoadError::ValidatorConfig {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Loaded validator `{}` (plugin `{}`)", id, plugin.id());
        Ok(Validator::new(def, plugin))
    }

    /// Loads an explicit list of validators.
    ///
    /// Every id is attempted; failures are collected into one
    /// [`LoadError::Batch`] instead of stopping at the first. Repeated ids
    /// are loaded once, at their first position.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Batch`] listing every failed id.
    pub fn load_validators<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Validator>, LoadError> {
        let mut seen = HashSet::new();
        let mut loaded = Vec::new();
        let mut errors = Vec::new();

        for id in ids.iter().map(AsRef::as_ref) {
            if !seen.insert(id) {
                continue;
            }
            match self.load_validator(id) {
                Ok(v) => loaded.push(v),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(loaded)
        } else {
            Err(LoadError::Batch(errors))
        }
    }
}

fn config_error(id: &str, e: &ModelError) -> LoadError {
    LoadError::ValidatorConfig {
        id: id.to_string(),
        reason: e.to_string(),
    }
}

fn convert_def(dto: &ValidatorDefDto) -> Result<ValidatorDef, LoadError> {
    let id = Id::new(&dto.id).map_err(|e| config_error(&dto.id, &e))?;
    let plugin = match &dto.plugin {
        Some(p) => Id::new(p).map_err(|e| LoadError::ValidatorConfig {
            id: dto.id.clone(),
            reason: format!("plugin: {e}"),
        })?,
        None => id.clone(),
    };

    let files = convert_globs(&dto.id, "files", &dto.files)?;
    let exclude = convert_globs(&dto.id, "exclude", &dto.exclude)?;

    let severity = dto
        .severity
        .as_deref()
        .map(|s| {
            Severity::parse(s).ok_or_else(|| LoadError::ValidatorConfig {
                id: dto.id.clone(),
                reason: format!("unknown severity `{s}`, expected: error, warning, info"),
            })
        })
        .transpose()?;

    Ok(ValidatorDef {
        name: dto.name.clone().unwrap_or_else(|| dto.id.clone()),
        kind: dto
            .kind
            .clone()
            .unwrap_or_else(|| plugin.as_str().to_string()),
        id,
        plugin,
        config: ValidatorConfig {
            files,
            exclude,
            severity,
            params: dto.params.clone(),
        },
    })
}

fn convert_globs(id: &str, field: &str, raw: &[String]) -> Result<Vec<GlobPattern>, LoadError> {
    raw.iter()
        .enumerate()
        .map(|(i, p)| {
            GlobPattern::new(p).map_err(|e| LoadError::ValidatorConfig {
                id: id.to_string(),
                reason: format!("{field}[{i}]: {e}"),
            })
        })
        .collect()
}
