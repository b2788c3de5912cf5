//! Context handed to plugins during execution.

use crate::plugin::PluginError;
use crate::validator::ValidatorConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Context provided to a plugin for one validator run.
///
/// Carries the validator's identity, configuration, and the project root
/// that candidate file paths are relative to.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorContext<'a> {
    /// Id of the validator being run.
    pub id: &'a str,
    /// The validator configuration.
    pub config: &'a ValidatorConfig,
    /// Project root directory.
    pub root: &'a Path,
}

impl<'a> ValidatorContext<'a> {
    /// Creates a new validator context.
    #[must_use]
    pub fn new(id: &'a str, config: &'a ValidatorConfig, root: &'a Path) -> Self {
        Self { id, config, root }
    }

    /// Iterates over the candidate files this validator targets.
    pub fn select<'f>(&self, files: &'f [PathBuf]) -> impl Iterator<Item = &'f PathBuf> + 'f
    where
        'a: 'f,
    {
        let config = self.config;
        files.iter().filter(move |f| config.targets(f))
    }

    /// Resolves a candidate path against the project root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Reads a candidate file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the file cannot be read.
    pub fn read(&self, path: &Path) -> Result<String, PluginError> {
        let full = self.resolve(path);
        std::fs::read_to_string(&full).map_err(|source| PluginError::Io { path: full, source })
    }

    /// Reads a candidate file as text, returning `None` for files that are
    /// not valid UTF-8 (images, archives, compiled artifacts).
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the file cannot be read.
    pub fn read_text(&self, path: &Path) -> Result<Option<String>, PluginError> {
        let full = self.resolve(path);
        let bytes = std::fs::read(&full).map_err(|source| PluginError::Io { path: full, source })?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(_) => {
                debug!("Skipping {}: not UTF-8 text", path.display());
                Ok(None)
            }
        }
    }

    /// Returns the path relative to the project root, for reporting.
    #[must_use]
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GlobPattern;

    #[test]
    fn select_applies_include_and_exclude() {
        let config = ValidatorConfig {
            files: vec![GlobPattern::new("src/**").unwrap()],
            exclude: vec![GlobPattern::new("**/*.test.js").unwrap()],
            ..ValidatorConfig::default()
        };
        let ctx = ValidatorContext::new("v", &config, Path::new("/project"));
        let files = vec![
            PathBuf::from("src/a.js"),
            PathBuf::from("src/a.test.js"),
            PathBuf::from("lib/b.js"),
        ];

        let selected: Vec<_> = ctx.select(&files).collect();
        assert_eq!(selected, vec![&PathBuf::from("src/a.js")]);
    }

    #[test]
    fn empty_files_selects_everything() {
        let config = ValidatorConfig::default();
        let ctx = ValidatorContext::new("v", &config, Path::new("."));
        let files = vec![PathBuf::from("a"), PathBuf::from("b/c")];
        assert_eq!(ctx.select(&files).count(), 2);
    }

    #[test]
    fn read_text_skips_binary_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.js"), "eval(x);\n").unwrap();
        std::fs::write(tmp.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0xff, 0xfe]).unwrap();

        let config = ValidatorConfig::default();
        let ctx = ValidatorContext::new("v", &config, tmp.path());
        assert_eq!(
            ctx.read_text(Path::new("a.js")).unwrap().as_deref(),
            Some("eval(x);\n")
        );
        assert_eq!(ctx.read_text(Path::new("logo.png")).unwrap(), None);
        assert!(ctx.read(Path::new("logo.png")).is_err());
        assert!(ctx.read_text(Path::new("missing.js")).is_err());
    }

    #[test]
    fn resolve_and_relative() {
        let config = ValidatorConfig::default();
        let ctx = ValidatorContext::new("v", &config, Path::new("/project"));
        assert_eq!(
            ctx.resolve(Path::new("src/a.js")),
            PathBuf::from("/project/src/a.js")
        );
        assert_eq!(
            ctx.relative(Path::new("/project/src/a.js")),
            PathBuf::from("src/a.js")
        );
    }
}
