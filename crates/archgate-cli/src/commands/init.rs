//! Init command implementation.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "archgate.toml";

const DEFAULT_CONFIG: &str = r#"# archgate configuration
#
# Validators are instances of built-in plugins (see `archgate list-validators`).
# Paths are relative to the directory holding this file.

default_profile = "ci"

[engine]
# Maximum number of validators run concurrently (default: CPU count)
# parallelism = 4
# Drop violations whose confidence is below this value
# confidence_threshold = 0.7

[overrides]
path = ".archgate/overrides.json"
# "rule-file" or "rule-file-line"
match = "rule-file"

[report]
dir = "archgate-report"
formats = ["json", "markdown"]

[selector]
exclude = [
    "**/target/**",
    "**/node_modules/**",
    "**/vendor/**",
]
respect_gitignore = true

[[validators]]
id = "no-eval"
plugin = "forbidden-pattern"
files = ["src/**/*.js", "src/**/*.ts"]
[validators.params]
patterns = ['\beval\s*\(']
message = "avoid `{match}`"
confidence = 0.9

[[validators]]
id = "domain-isolation"
plugin = "import-boundary"
files = ["src/domain/**"]
[validators.params]
deny = ["src/infra/**"]

[[validators]]
id = "file-names"
plugin = "file-naming"
files = ["src/**/*.ts"]
severity = "warning"
[validators.params]
style = "kebab"

[profiles.ci]
description = "Checks run on every pull request"
validators = [
    "no-eval",
    "domain-isolation",
    { id = "file-names", enabled = false },
]
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure validators");
    println!("  2. Run: archgate check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(&path, DEFAULT_CONFIG)?;
    Ok(path)
}
