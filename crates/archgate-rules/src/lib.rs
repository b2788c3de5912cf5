//! # archgate-rules
//!
//! Built-in validator plugins for archgate.
//!
//! ## Available Plugins
//!
//! | Id | Description |
//! |----|-------------|
//! | `forbidden-pattern` | Forbids lines matching configured regexes |
//! | `import-boundary` | Forbids imports crossing layer boundaries (Rust, JS, TS) |
//! | `registration-completeness` | Requires defined items to appear in a registry file |
//! | `file-naming` | Enforces a casing convention on file names |
//!
//! ## Usage
//!
//! ```ignore
//! use archgate_core::{Engine, Pipeline};
//! use archgate_rules::builtin_registry;
//!
//! let registry = builtin_registry();
//! let output = Pipeline::new(&config, &registry, &engine).run(&request, &files)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod common;
mod file_naming;
mod forbidden_pattern;
mod import_boundary;
mod registration;

pub use common::code_hash;
pub use file_naming::{FileNaming, NamingStyle};
pub use forbidden_pattern::ForbiddenPattern;
pub use import_boundary::{path_matches, ImportBoundary};
pub use registration::RegistrationCompleteness;

use archgate_core::{PluginRegistry, ValidatorPlugin};
use std::sync::Arc;

/// Returns every built-in plugin.
#[must_use]
pub fn all_plugins() -> Vec<Arc<dyn ValidatorPlugin>> {
    vec![
        Arc::new(ForbiddenPattern::new()),
        Arc::new(ImportBoundary::new()),
        Arc::new(RegistrationCompleteness::new()),
        Arc::new(FileNaming::new()),
    ]
}

/// Returns a registry holding every built-in plugin.
#[must_use]
pub fn builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    for plugin in all_plugins() {
        registry.register_arc(plugin);
    }
    registry
}
