//! # archgate-core
//!
//! Core framework for pluggable architecture-compliance checks.
//!
//! This crate provides:
//!
//! - [`ValidatorPlugin`] trait implemented by every check
//! - [`PluginRegistry`] mapping plugin ids to implementations
//! - [`ValidatorLoader`] resolving ids and profiles into [`Validator`]s
//! - [`Engine`] running validators concurrently with fault isolation
//! - [`OverrideStore`] persisting accepted false positives
//! - [`filter_by_threshold`] dropping low-confidence findings
//! - [`Report`] and its renderers
//! - [`Pipeline`] wiring all of the above into one run
//!
//! ## Example
//!
//! ```ignore
//! use archgate_core::{Engine, Pipeline, ProjectConfig, ValidatorRequest};
//!
//! let config = ProjectConfig::from_file("archgate.toml".as_ref())?;
//! let engine = Engine::builder().root(".").build()?;
//! let output = Pipeline::new(&config, &registry, &engine)
//!     .run(&ValidatorRequest::Profile("security".into()), &files)?;
//! println!("{}", output.report.to_json()?);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod engine;
mod filter;
mod loader;
mod model;
mod overrides;
mod pipeline;
mod plugin;
mod registry;
mod report;
mod types;
mod validator;

pub use config::{
    ConfigError, EngineSettings, OverrideSettings, ProfileDto, ProfileEntryDto, ProjectConfig,
    ReportSettings, SelectorSettings, ValidatorDefDto, DEFAULT_OVERRIDE_PATH, DEFAULT_REPORT_DIR,
};
pub use context::ValidatorContext;
pub use engine::{Engine, EngineBuilder, ExecutionError};
pub use filter::filter_by_threshold;
pub use loader::{LoadError, ValidatorLoader, ValidatorRequest};
pub use model::{ConfidenceThreshold, GlobPattern, Id, ModelError};
pub use overrides::{
    LoadStatus, MatchStrictness, Override, OverrideCriteria, OverrideStatistics, OverrideStatus,
    OverrideStore, OverrideStoreError,
};
pub use pipeline::{Pipeline, RunOutput};
pub use plugin::{reject_unknown_params, PluginError, PluginOutput, ValidatorPlugin};
pub use registry::PluginRegistry;
pub use report::{
    CompactRenderer, JsonRenderer, MarkdownRenderer, Report, ReportError, ReportFormat,
    ReportRenderer, ReportWriter, RunMetadata, Summary, TextRenderer,
};
pub use types::{
    count_by_severity, normalize_path, RunOutcome, Severity, ValidationResult, Violation,
    DEFAULT_CONFIDENCE,
};
pub use validator::{Profile, ProfileEntry, Validator, ValidatorConfig, ValidatorDef};
