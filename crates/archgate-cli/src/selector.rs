//! Candidate file selection.

use anyhow::{Context, Result};
use archgate_core::{normalize_path, GlobPattern, SelectorSettings};
use std::path::{Path, PathBuf};

/// Compiled include/exclude patterns.
#[derive(Debug, Clone)]
pub struct Selector {
    include: Vec<GlobPattern>,
    exclude: Vec<GlobPattern>,
    respect_gitignore: bool,
}

impl Selector {
    /// Builds a selector from config settings plus extra `--exclude` patterns.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid pattern.
    pub fn new(settings: &SelectorSettings, extra_exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile(&settings.include)?,
            exclude: compile(settings.exclude.iter().chain(extra_exclude))?,
            respect_gitignore: settings.respect_gitignore,
        })
    }

    /// Also excludes the tool's own artifacts: the report directory and the
    /// override file. Paths outside `root` are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact path does not form a valid pattern.
    pub fn excluding_artifacts(mut self, root: &Path, report_dir: &Path, overrides: &Path) -> Result<Self> {
        for (path, is_dir) in [(report_dir, true), (overrides, false)] {
            let Some(relative) = root_relative(root, path) else {
                continue;
            };
            let escaped = glob::Pattern::escape(&normalize_path(&relative));
            if escaped.is_empty() {
                continue;
            }
            let pattern = if is_dir { format!("{escaped}/**") } else { escaped };
            self.exclude.push(
                GlobPattern::new(&pattern)
                    .with_context(|| format!("Invalid artifact path `{}`", path.display()))?,
            );
        }
        Ok(self)
    }

    /// Returns true if a root-relative path is selected.
    #[must_use]
    pub fn selects(&self, relative: &Path) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(relative));
        included && !self.exclude.iter().any(|p| p.matches(relative))
    }

    /// Walks `start` and returns selected files relative to `root`, sorted
    /// and de-duplicated.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory walk fails.
    pub fn discover(&self, root: &Path, start: &Path) -> Result<Vec<PathBuf>> {
        let mut builder = ignore::WalkBuilder::new(start);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git");

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry.with_context(|| format!("Failed to walk {}", start.display()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            if self.selects(&relative) {
                files.push(relative);
            }
        }

        files.sort();
        files.dedup();
        tracing::debug!("Selected {} candidate file(s) under {}", files.len(), start.display());
        Ok(files)
    }
}

fn root_relative(root: &Path, path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        path.strip_prefix(root).ok().map(Path::to_path_buf)
    } else {
        Some(path.to_path_buf())
    }
}

fn compile<'a>(patterns: impl IntoIterator<Item = &'a String>) -> Result<Vec<GlobPattern>> {
    patterns
        .into_iter()
        .map(|p| GlobPattern::new(p).with_context(|| format!("Invalid selector pattern `{p}`")))
        .collect()
}
