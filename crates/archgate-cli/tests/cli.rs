//! End-to-end tests of the `archgate` binary: exit codes and the
//! check/override round trip.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"
[[validators]]
id = "no-eval"
plugin = "forbidden-pattern"
files = ["src/**/*.js"]
[validators.params]
patterns = ['\beval\(']
"#;

#[allow(deprecated)]
fn archgate(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("archgate").unwrap();
    cmd.current_dir(dir)
        .env_remove("ARCHGATE_CONFIG")
        .env("ARCHGATE_CONFIG_DIR", dir.join("no-global"));
    cmd
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("archgate.toml"), CONFIG).unwrap();
    std::fs::create_dir_all(tmp.path().join("src")).unwrap();
    std::fs::write(tmp.path().join("src/app.js"), "eval(x);\n").unwrap();
    tmp
}

#[test]
fn violation_then_accept_then_clean() {
    let tmp = project();

    archgate(tmp.path())
        .args(["check", "--format", "compact"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("src/app.js:1"));

    archgate(tmp.path())
        .args(["override", "accept", "--rule", "no-eval", "--reason", "sandboxed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted 1 violation(s)"));

    archgate(tmp.path())
        .args(["check", "--no-report"])
        .assert()
        .code(0);
}

#[test]
fn unknown_validator_exits_two() {
    let tmp = project();
    archgate(tmp.path())
        .args(["check", "--validator", "nope", "--no-report"])
        .assert()
        .code(2);
}

#[test]
fn init_then_list() {
    let tmp = TempDir::new().unwrap();
    archgate(tmp.path()).arg("init").assert().success();
    archgate(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    archgate(tmp.path())
        .arg("list-validators")
        .assert()
        .success()
        .stdout(predicate::str::contains("import-boundary"))
        .stdout(predicate::str::contains("ci (default)"));
}
