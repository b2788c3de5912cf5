//! Plugin that enforces import boundaries between layers.
//!
//! Rust sources are parsed with `syn` and every `use` tree is expanded into
//! flat `a::b::c` paths. JavaScript and TypeScript sources are scanned for
//! `import`, `export ... from`, dynamic `import()`, and `require()`
//! specifiers; relative specifiers are resolved against the importing file
//! so patterns can name project paths.
//!
//! Patterns are matched segment by segment: `*` matches one segment and
//! `**` matches any number. Rust paths split on `::`, module specifiers
//! on `/`.
//!
//! # Example
//!
//! ```toml
//! [[validators]]
//! id = "domain-isolation"
//! plugin = "import-boundary"
//! files = ["src/domain/**"]
//! [validators.params]
//! deny = ["sqlx::**", "src/infra/**"]
//! allow = ["src/infra/types"]
//! ```

use crate::common::{self, code_hash};
use archgate_core::{
    PluginError, PluginOutput, Severity, ValidatorConfig, ValidatorContext, ValidatorPlugin,
    Violation,
};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use syn::visit::Visit;
use tracing::debug;

/// Plugin id.
pub const ID: &str = "import-boundary";

const PARAMS: &[&str] = &["deny", "allow", common::MESSAGE, common::CONFIDENCE];

const DEFAULT_MESSAGE: &str = "import of `{import}` crosses a forbidden boundary (`{pattern}`)";

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// Reports imports matching a `deny` pattern and no `allow` pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportBoundary;

impl ImportBoundary {
    /// Creates the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// One import found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Import {
    path: String,
    line: usize,
    separator: &'static str,
}

impl ValidatorPlugin for ImportBoundary {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Forbids imports that cross configured layer boundaries"
    }

    fn parameters(&self) -> &'static [&'static str] {
        PARAMS
    }

    fn validate_config(&self, config: &ValidatorConfig) -> Result<(), PluginError> {
        archgate_core::reject_unknown_params(PARAMS, config)?;
        if config.get_str_array("deny").is_empty() {
            return Err(PluginError::InvalidConfig(
                "`deny` must list at least one import pattern".to_string(),
            ));
        }
        common::confidence(config)?;
        Ok(())
    }

    fn check(
        &self,
        ctx: &ValidatorContext<'_>,
        files: &[PathBuf],
    ) -> Result<PluginOutput, PluginError> {
        let config = ctx.config;
        let deny = config.get_str_array("deny");
        let allow = config.get_str_array("allow");
        let template = config.get_str(common::MESSAGE).unwrap_or(DEFAULT_MESSAGE);
        let confidence = common::confidence(config)?;
        let specifier = specifier_regex()?;

        let mut out = PluginOutput::new();
        for file in ctx.select(files) {
            let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if ext != "rs" && !SCRIPT_EXTENSIONS.contains(&ext) {
                continue;
            }
            let Some(content) = ctx.read_text(file)? else {
                out = out.detail(format!("skipped {}: not UTF-8 text", file.display()));
                continue;
            };
            let imports = if ext == "rs" {
                match rust_imports(&content) {
                    Ok(imports) => imports,
                    Err(e) => {
                        debug!("Skipping {}: {}", file.display(), e);
                        out = out.detail(format!("skipped {}: not valid Rust", file.display()));
                        continue;
                    }
                }
            } else {
                script_imports(specifier, file, &content)
            };

            let lines: Vec<&str> = content.lines().collect();
            for import in imports {
                let Some(pattern) = deny
                    .iter()
                    .find(|p| path_matches(&import.path, p, import.separator))
                else {
                    continue;
                };
                if allow
                    .iter()
                    .any(|p| path_matches(&import.path, p, import.separator))
                {
                    continue;
                }

                let source_line = lines.get(import.line.saturating_sub(1)).copied().unwrap_or("");
                let message = template
                    .replace("{import}", &import.path)
                    .replace("{pattern}", pattern);
                let mut v = Violation::new(ctx.id, file.clone(), import.line, Severity::Error, message)
                    .with_code(code_hash(ctx.id, source_line));
                if let Some(c) = confidence {
                    v = v.with_confidence(c);
                }
                out.violations.push(v);
            }
        }
        Ok(out)
    }
}

/// Checks if a path matches a pattern, segment by segment.
///
/// `*` matches exactly one segment, `**` any number of segments (including
/// none).
#[must_use]
pub fn path_matches(path: &str, pattern: &str, separator: &str) -> bool {
    let path_parts: Vec<&str> = path.split(separator).collect();
    let pattern_parts: Vec<&str> = pattern.split(separator).collect();
    match_parts(&path_parts, &pattern_parts)
}

fn match_parts(path: &[&str], pattern: &[&str]) -> bool {
    let Some((&first, rest)) = pattern.split_first() else {
        return path.is_empty();
    };
    match first {
        "**" => (0..=path.len()).any(|i| match_parts(&path[i..], rest)),
        "*" => !path.is_empty() && match_parts(&path[1..], rest),
        literal => path.first() == Some(&literal) && match_parts(&path[1..], rest),
    }
}

// ── Rust ──

struct UseCollector {
    imports: Vec<Import>,
}

impl<'ast> Visit<'ast> for UseCollector {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        expand_use_tree(&node.tree, "", &mut self.imports);
    }
}

/// Flattens a use tree: `use a::{b, c::d}` yields `a::b` and `a::c::d`.
fn expand_use_tree(tree: &syn::UseTree, prefix: &str, out: &mut Vec<Import>) {
    let join = |ident: &dyn std::fmt::Display| {
        if prefix.is_empty() {
            ident.to_string()
        } else {
            format!("{prefix}::{ident}")
        }
    };
    match tree {
        syn::UseTree::Path(p) => expand_use_tree(&p.tree, &join(&p.ident), out),
        syn::UseTree::Name(n) => out.push(rust_import(join(&n.ident), n.ident.span())),
        syn::UseTree::Rename(r) => out.push(rust_import(join(&r.ident), r.ident.span())),
        syn::UseTree::Glob(g) => out.push(rust_import(join(&"*"), g.star_token.spans[0])),
        syn::UseTree::Group(g) => {
            for item in &g.items {
                expand_use_tree(item, prefix, out);
            }
        }
    }
}

fn rust_import(path: String, span: proc_macro2::Span) -> Import {
    Import {
        path,
        line: span.start().line,
        separator: "::",
    }
}

fn rust_imports(content: &str) -> Result<Vec<Import>, syn::Error> {
    let ast = syn::parse_file(content)?;
    let mut collector = UseCollector {
        imports: Vec::new(),
    };
    collector.visit_file(&ast);
    Ok(collector.imports)
}

// ── JavaScript / TypeScript ──

// `import x from "m"`, `export { x } from "m"`, `import "m"`,
// `import("m")`, `require("m")`.
const SPECIFIER_PATTERN: &str =
    r#"(?:\bfrom\s*|^\s*import\s*|\bimport\s*\(\s*|\brequire\s*\(\s*)["']([^"'\n]+)["']"#;

fn specifier_regex() -> Result<&'static Regex, PluginError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SPECIFIER_PATTERN))
        .as_ref()
        .map_err(|e| PluginError::Failed(format!("import specifier pattern: {e}")))
}

fn script_imports(re: &Regex, file: &Path, content: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if common::is_comment_line(line) {
            continue;
        }
        for cap in re.captures_iter(line) {
            imports.push(Import {
                path: resolve_specifier(file, &cap[1]),
                line: idx + 1,
                separator: "/",
            });
        }
    }
    imports
}

/// Resolves `./x` and `../x` against the importing file's directory.
/// Package specifiers are returned unchanged.
fn resolve_specifier(file: &Path, specifier: &str) -> String {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return specifier.to_string();
    }
    let base = file.parent().unwrap_or_else(|| Path::new(""));
    let mut parts: Vec<String> = Vec::new();
    for component in base.join(specifier).components() {
        match component {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    parts.push("..".to_string());
                }
            }
            _ => {}
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(params: &str) -> ValidatorConfig {
        ValidatorConfig {
            params: toml::from_str(params).unwrap(),
            ..ValidatorConfig::default()
        }
    }

    #[test]
    fn segment_matching() {
        assert!(path_matches("std::fs::read", "std::fs::*", "::"));
        assert!(path_matches("std::fs::read", "std::**", "::"));
        assert!(path_matches("std", "std::**", "::"));
        assert!(!path_matches("std::fs::read", "tokio::*", "::"));
        assert!(!path_matches("std::fs::read", "std::*", "::"));
        assert!(path_matches("src/infra/db", "src/infra/**", "/"));
        assert!(path_matches("@scope/pkg/x", "@scope/**", "/"));
        assert!(!path_matches("src/infrastructure", "src/infra/**", "/"));
    }

    #[test]
    fn expands_rust_use_trees() {
        let imports = rust_imports(
            "use std::collections::{HashMap, btree_map::Entry as E};\n\nuse sqlx::*;\nfn f() { use crate::infra::Db; }\n",
        )
        .unwrap();
        let paths: Vec<(&str, usize)> = imports.iter().map(|i| (i.path.as_str(), i.line)).collect();
        assert_eq!(
            paths,
            vec![
                ("std::collections::HashMap", 1),
                ("std::collections::btree_map::Entry", 1),
                ("sqlx::*", 3),
                ("crate::infra::Db", 4),
            ]
        );
    }

    #[test]
    fn specifier_pattern_compiles() {
        let re = specifier_regex().unwrap();
        assert!(std::ptr::eq(re, specifier_regex().unwrap()));
        assert_eq!(&re.captures(r#"import a from "b";"#).unwrap()[1], "b");
    }

    #[test]
    fn finds_script_specifiers() {
        let content = r#"import React from "react";
import { db } from '../infra/db';
export * from "./local";
const fs = require("fs");
// import old from "legacy";
const lazy = await import("./lazy");
import "./side-effect";
"#;
        let imports = script_imports(
            specifier_regex().unwrap(),
            Path::new("src/domain/user.ts"),
            content,
        );
        let paths: Vec<&str> = imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "react",
                "src/infra/db",
                "src/domain/local",
                "fs",
                "src/domain/lazy",
                "src/domain/side-effect",
            ]
        );
    }

    #[test]
    fn reports_denied_imports_unless_allowed() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/domain")).unwrap();
        std::fs::write(
            dir.path().join("src/domain/user.ts"),
            "import { db } from '../infra/db';\nimport { Id } from '../infra/types';\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("src/domain/repo.rs"),
            "use sqlx::PgPool;\nuse crate::model::User;\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("src/domain/broken.rs"), "fn {").unwrap();

        let config = config(
            r#"
deny = ["src/infra/**", "sqlx::**"]
allow = ["src/infra/types"]
confidence = 0.8
"#,
        );
        let files = vec![
            PathBuf::from("src/domain/user.ts"),
            PathBuf::from("src/domain/repo.rs"),
            PathBuf::from("src/domain/broken.rs"),
        ];
        let ctx = ValidatorContext::new("domain-isolation", &config, dir.path());
        let out = ImportBoundary.check(&ctx, &files).unwrap();

        let found: Vec<(String, usize)> = out
            .violations
            .iter()
            .map(|v| (v.file_path.display().to_string(), v.line))
            .collect();
        assert_eq!(
            found,
            vec![
                ("src/domain/user.ts".to_string(), 1),
                ("src/domain/repo.rs".to_string(), 1),
            ]
        );
        assert!(out.violations[1].message.contains("sqlx::PgPool"));
        assert!(out.violations.iter().all(|v| v.confidence == Some(0.8)));
        assert_eq!(out.details.len(), 1);
        assert!(out.details[0].contains("broken.rs"));
    }

    #[test]
    fn requires_deny() {
        assert!(ImportBoundary.validate_config(&config("allow = ['x']")).is_err());
        assert!(ImportBoundary.validate_config(&config("deny = ['x']")).is_ok());
    }
}
