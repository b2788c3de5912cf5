//! Plugin that enforces a casing convention on file names.
//!
//! The stem is everything before the first `.`, so `user-card.test.tsx`
//! is checked as `user-card`. Dotfiles are ignored.

use crate::common::{self, code_hash};
use archgate_core::{
    PluginError, PluginOutput, Severity, ValidatorConfig, ValidatorContext, ValidatorPlugin,
    Violation,
};
use std::path::PathBuf;

/// Plugin id.
pub const ID: &str = "file-naming";

const PARAMS: &[&str] = &["style", common::CONFIDENCE];

/// A file-name casing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStyle {
    /// `user-card`
    Kebab,
    /// `user_card`
    Snake,
    /// `UserCard`
    Pascal,
    /// `userCard`
    Camel,
}

impl NamingStyle {
    /// Parses a style name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kebab" | "kebab-case" => Some(Self::Kebab),
            "snake" | "snake_case" => Some(Self::Snake),
            "pascal" | "PascalCase" => Some(Self::Pascal),
            "camel" | "camelCase" => Some(Self::Camel),
            _ => None,
        }
    }

    /// Returns the canonical style name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Kebab => "kebab-case",
            Self::Snake => "snake_case",
            Self::Pascal => "PascalCase",
            Self::Camel => "camelCase",
        }
    }

    /// Tests whether `stem` follows this style.
    #[must_use]
    pub fn accepts(self, stem: &str) -> bool {
        let mut chars = stem.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        match self {
            Self::Kebab => lower_words(stem, '-'),
            Self::Snake => lower_words(stem, '_'),
            Self::Pascal => {
                first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_alphanumeric())
            }
            Self::Camel => first.is_ascii_lowercase() && chars.all(|c| c.is_ascii_alphanumeric()),
        }
    }

    /// Rewrites `stem` in this style.
    #[must_use]
    pub fn convert(self, stem: &str) -> String {
        let words = split_words(stem);
        match self {
            Self::Kebab => words.join("-"),
            Self::Snake => words.join("_"),
            Self::Pascal => words.iter().map(|w| capitalize(w)).collect(),
            Self::Camel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
                .collect(),
        }
    }
}

fn lower_words(stem: &str, sep: char) -> bool {
    stem.split(sep).all(|w| {
        !w.is_empty() && w.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}

/// Splits on separators and lower-to-upper case transitions, lowercased.
fn split_words(stem: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in stem.chars() {
        if c == '-' || c == '_' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn style(config: &ValidatorConfig) -> Result<NamingStyle, PluginError> {
    match config.get_str("style") {
        None => Ok(NamingStyle::Kebab),
        Some(s) => NamingStyle::parse(s).ok_or_else(|| {
            PluginError::InvalidConfig(format!(
                "unknown style `{s}`, expected: kebab, snake, pascal, camel"
            ))
        }),
    }
}

/// Reports files whose stem does not follow the configured style.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNaming;

impl FileNaming {
    /// Creates the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ValidatorPlugin for FileNaming {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Enforces a casing convention on file names"
    }

    fn parameters(&self) -> &'static [&'static str] {
        PARAMS
    }

    fn validate_config(&self, config: &ValidatorConfig) -> Result<(), PluginError> {
        archgate_core::reject_unknown_params(PARAMS, config)?;
        style(config)?;
        common::confidence(config)?;
        Ok(())
    }

    fn check(
        &self,
        ctx: &ValidatorContext<'_>,
        files: &[PathBuf],
    ) -> Result<PluginOutput, PluginError> {
        let style = style(ctx.config)?;
        let confidence = common::confidence(ctx.config)?;

        let mut violations = Vec::new();
        for file in ctx.select(files) {
            let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let (stem, rest) = name.split_once('.').unwrap_or((name, ""));
            if style.accepts(stem) {
                continue;
            }

            let fixed = style.convert(stem);
            let suggested = if rest.is_empty() {
                fixed
            } else {
                format!("{fixed}.{rest}")
            };
            let mut v = Violation::new(
                ctx.id,
                file.clone(),
                0,
                Severity::Warning,
                format!("file name `{name}` is not {}", style.name()),
            )
            .with_code(code_hash(ctx.id, name))
            .with_suggestion(format!("rename to `{suggested}`"));
            if let Some(c) = confidence {
                v = v.with_confidence(c);
            }
            violations.push(v);
        }
        Ok(PluginOutput::with_violations(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_each_style() {
        assert!(NamingStyle::Kebab.accepts("user-card2"));
        assert!(!NamingStyle::Kebab.accepts("user--card"));
        assert!(!NamingStyle::Kebab.accepts("userCard"));
        assert!(NamingStyle::Snake.accepts("user_card"));
        assert!(!NamingStyle::Snake.accepts("user-card"));
        assert!(NamingStyle::Pascal.accepts("UserCard"));
        assert!(!NamingStyle::Pascal.accepts("userCard"));
        assert!(NamingStyle::Camel.accepts("userCard"));
        assert!(!NamingStyle::Camel.accepts("user_card"));
        assert!(!NamingStyle::Camel.accepts(""));
    }

    #[test]
    fn converts_between_styles() {
        assert_eq!(NamingStyle::Kebab.convert("UserCard"), "user-card");
        assert_eq!(NamingStyle::Snake.convert("userCard"), "user_card");
        assert_eq!(NamingStyle::Pascal.convert("user-card"), "UserCard");
        assert_eq!(NamingStyle::Camel.convert("user_card_v2"), "userCardV2");
    }

    #[test]
    fn reports_misnamed_files_with_suggestion() {
        let config = ValidatorConfig {
            params: toml::from_str("style = 'kebab'\nconfidence = 0.6").unwrap(),
            ..ValidatorConfig::default()
        };
        let files: Vec<PathBuf> = ["src/UserCard.test.tsx", "src/user-list.tsx", "src/.eslintrc.js"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let ctx = ValidatorContext::new("naming", &config, std::path::Path::new("."));
        let out = FileNaming.check(&ctx, &files).unwrap();

        assert_eq!(out.violations.len(), 1);
        let v = &out.violations[0];
        assert_eq!(v.line, 0);
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.confidence, Some(0.6));
        assert_eq!(
            v.auto_fix_suggestion.as_deref(),
            Some("rename to `user-card.test.tsx`")
        );
    }

    #[test]
    fn rejects_unknown_style() {
        let config = ValidatorConfig {
            params: toml::from_str("style = 'screaming'").unwrap(),
            ..ValidatorConfig::default()
        };
        assert!(FileNaming.validate_config(&config).is_err());
    }
}
