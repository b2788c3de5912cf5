//! Integration test: built-in plugins configured from TOML and run through
//! the full pipeline.

use archgate_core::{
    Engine, LoadError, Pipeline, ProjectConfig, Severity, ValidatorRequest,
};
use archgate_rules::builtin_registry;
use std::path::PathBuf;
use tempfile::TempDir;

const CONFIG: &str = r#"
[[validators]]
id = "no-eval"
plugin = "forbidden-pattern"
files = ["src/**/*.js"]
[validators.params]
patterns = ['\beval\s*\(']
confidence = 0.95

[[validators]]
id = "domain-isolation"
plugin = "import-boundary"
files = ["src/domain/**"]
severity = "warning"
[validators.params]
deny = ["src/infra/**"]

[[validators]]
id = "naming"
plugin = "file-naming"
files = ["src/**/*.js"]
[validators.params]
style = "kebab"

[[validators]]
id = "bad-regex"
plugin = "forbidden-pattern"
[validators.params]
patterns = ["("]

[profiles.ci]
validators = ["no-eval", "domain-isolation", "naming"]
"#;

fn project() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let files = [
        ("src/domain/user-service.js", "import { db } from '../infra/db';\n"),
        ("src/infra/db.js", "module.exports = eval(source);\n"),
        ("src/infra/QueryBuilder.js", "export const q = 1;\n"),
    ];
    let mut paths = Vec::new();
    for (rel, content) in files {
        let full = dir.path().join(rel);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
        paths.push(PathBuf::from(rel));
    }
    (dir, paths)
}

#[test]
fn ci_profile_finds_one_issue_per_validator() {
    let (dir, files) = project();
    let config = ProjectConfig::parse(CONFIG).unwrap();
    let registry = builtin_registry();
    let engine = Engine::builder().root(dir.path()).build().unwrap();

    let output = Pipeline::new(&config, &registry, &engine)
        .run(&ValidatorRequest::Profile("ci".into()), &files)
        .unwrap();

    let results = &output.report.results;
    assert_eq!(results.len(), 3);
    for r in results {
        assert_eq!(r.violations.len(), 1, "{}: {:?}", r.validator, r.violations);
    }

    assert_eq!(results[0].violations[0].file_path, PathBuf::from("src/infra/db.js"));
    assert_eq!(results[1].violations[0].severity, Severity::Warning);
    assert_eq!(
        results[2].violations[0].file_path,
        PathBuf::from("src/infra/QueryBuilder.js")
    );
    assert!(!output.outcome.is_success());
}

#[test]
fn invalid_plugin_params_fail_at_load_time() {
    let (dir, files) = project();
    let config = ProjectConfig::parse(CONFIG).unwrap();
    let registry = builtin_registry();
    let engine = Engine::builder().root(dir.path()).build().unwrap();

    let err = Pipeline::new(&config, &registry, &engine)
        .run(&ValidatorRequest::Single("bad-regex".into()), &files)
        .unwrap_err();
    assert!(matches!(err, LoadError::ValidatorConfig { ref id, .. } if id == "bad-regex"));
}

#[test]
fn binary_file_in_candidates_does_not_fail_validators() {
    let (dir, mut files) = project();
    std::fs::write(dir.path().join("src/logo.png"), [0x89, b'P', b'N', b'G', 0xc3, 0x28]).unwrap();
    files.push(PathBuf::from("src/logo.png"));

    let config = ProjectConfig::parse(
        r#"
[[validators]]
id = "no-eval"
plugin = "forbidden-pattern"
[validators.params]
patterns = ['\beval\(']
"#,
    )
    .unwrap();
    let registry = builtin_registry();
    let engine = Engine::builder().root(dir.path()).build().unwrap();

    let output = Pipeline::new(&config, &registry, &engine)
        .run(&ValidatorRequest::Single("no-eval".into()), &files)
        .unwrap();

    let result = &output.report.results[0];
    assert!(result.error.is_none(), "{:?}", result.error);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].file_path, PathBuf::from("src/infra/db.js"));
}
