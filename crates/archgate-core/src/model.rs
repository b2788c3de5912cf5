//! Validated newtypes shared by configuration and plugins.
//!
//! All invariants are enforced at construction time.

use std::fmt;
use std::path::Path;

/// Errors raised when a newtype rejects its input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Identifier is empty.
    #[error("identifier must not be empty")]
    EmptyId,

    /// Identifier contains characters outside `[a-z0-9_-]`.
    #[error("invalid identifier `{id}`: only lowercase letters, digits, `-` and `_` are allowed")]
    InvalidId {
        /// The rejected identifier.
        id: String,
    },

    /// Glob pattern is empty.
    #[error("glob pattern must not be empty")]
    EmptyGlobPattern,

    /// Glob pattern failed to compile.
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidGlobPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Confidence value outside `[0, 1]`.
    #[error("confidence threshold {value} is outside [0, 1]")]
    ThresholdOutOfRange {
        /// The rejected value.
        value: f64,
    },
}

/// A validated validator, profile, or plugin identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(String);

impl Id {
    /// Creates a new identifier.
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty or contains invalid characters.
    pub fn new(id: &str) -> Result<Self, ModelError> {
        if id.is_empty() {
            return Err(ModelError::EmptyId);
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(ModelError::InvalidId { id: id.to_string() });
        }
        Ok(Self(id.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated glob pattern for file path matching.
///
/// The glob is compiled once at construction and reused for all match calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    raw: String,
    compiled: glob::Pattern,
}

impl GlobPattern {
    /// Creates a new glob pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or has invalid glob syntax.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        if pattern.is_empty() {
            return Err(ModelError::EmptyGlobPattern);
        }
        let compiled = glob::Pattern::new(pattern).map_err(|e| ModelError::InvalidGlobPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether a relative file path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let path_str = crate::types::normalize_path(path);
        if self.compiled.matches(&path_str) {
            return true;
        }
        // `dir/**` also matches everything below `dir/`.
        if let Some(prefix) = self.raw.strip_suffix("/**") {
            let normalized = prefix.trim_end_matches('/');
            if path_str.starts_with(normalized)
                && path_str
                    .as_bytes()
                    .get(normalized.len())
                    .is_some_and(|&b| b == b'/')
            {
                return true;
            }
        }
        // `**/x` also matches `x` at the root.
        if let Some(suffix) = self.raw.strip_prefix("**/") {
            if let Ok(rest) = glob::Pattern::new(suffix) {
                return rest.matches(&path_str);
            }
        }
        false
    }

    /// Returns the pattern as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A confidence threshold in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ConfidenceThreshold(f64);

impl ConfidenceThreshold {
    /// Creates a new threshold.
    ///
    /// # Errors
    ///
    /// Returns error if the value is not finite or outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ModelError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ModelError::ThresholdOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ConfidenceThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_accepts_kebab_and_snake() {
        assert!(Id::new("no-eval").is_ok());
        assert!(Id::new("secrets_scan2").is_ok());
    }

    #[test]
    fn id_rejects_bad_input() {
        assert_eq!(Id::new(""), Err(ModelError::EmptyId));
        assert!(matches!(Id::new("NoEval"), Err(ModelError::InvalidId { .. })));
        assert!(matches!(Id::new("no eval"), Err(ModelError::InvalidId { .. })));
    }

    #[test]
    fn glob_rejects_malformed() {
        assert_eq!(GlobPattern::new(""), Err(ModelError::EmptyGlobPattern));
        assert!(matches!(
            GlobPattern::new("src/[a"),
            Err(ModelError::InvalidGlobPattern { .. })
        ));
    }

    #[test]
    fn glob_matches_directory_suffix() {
        let pattern = GlobPattern::new("src/domain/**").unwrap();
        assert!(pattern.matches(Path::new("src/domain/user.ts")));
        assert!(pattern.matches(Path::new("./src/domain/deep/user.ts")));
        assert!(!pattern.matches(Path::new("src/domainx/user.ts")));
    }

    #[test]
    fn glob_double_star_prefix_matches_root_files() {
        let pattern = GlobPattern::new("**/*.js").unwrap();
        assert!(pattern.matches(Path::new("a.js")));
        assert!(pattern.matches(Path::new("src/a.js")));
        assert!(!pattern.matches(Path::new("src/a.ts")));
    }

    #[test]
    fn threshold_range() {
        assert!(ConfidenceThreshold::new(0.0).is_ok());
        assert!(ConfidenceThreshold::new(1.0).is_ok());
        assert!(ConfidenceThreshold::new(1.5).is_err());
        assert!(ConfidenceThreshold::new(-0.1).is_err());
        assert!(ConfidenceThreshold::new(f64::NAN).is_err());
    }
}
