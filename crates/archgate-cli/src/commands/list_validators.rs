//! List validators command implementation.

use anyhow::Result;
use archgate_core::ProjectConfig;
use archgate_rules::all_plugins;
use std::path::Path;

use crate::config_resolver;

/// Runs the list-validators command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let source = config_resolver::resolve(Path::new("."), config_path);
    let config = source.load()?;

    println!("Available plugins:\n");
    println!("{:<28} Description", "Plugin");
    println!("{}", "-".repeat(80));
    for plugin in all_plugins() {
        println!("{:<28} {}", plugin.id(), plugin.description());
        if !plugin.parameters().is_empty() {
            println!("{:<28} params: {}", "", plugin.parameters().join(", "));
        }
    }

    match source.path() {
        Some(path) => {
            println!("\nConfigured in {}:", path.display());
            print_configured(&config);
        }
        None => {
            println!("\nNo archgate.toml found. Run `archgate init` to create one.");
        }
    }
    Ok(())
}

fn print_configured(config: &ProjectConfig) {
    if config.validators.is_empty() {
        println!("  (no validators)");
    }
    for v in &config.validators {
        let plugin = v.plugin.as_deref().unwrap_or(&v.id);
        match &v.name {
            Some(name) if name != &v.id => println!("  {:<26} {plugin} ({name})", v.id),
            _ => println!("  {:<26} {plugin}", v.id),
        }
    }

    if config.profiles.is_empty() {
        return;
    }
    println!("\nProfiles:");
    for name in config.profiles.keys() {
        let Some(profile) = config.profile(name) else {
            continue;
        };
        let marker = if config.default_profile.as_deref() == Some(name) {
            " (default)"
        } else {
            ""
        };
        let ids: Vec<String> = profile
            .entries
            .iter()
            .map(|e| {
                if e.enabled {
                    e.id.clone()
                } else {
                    format!("{} [disabled]", e.id)
                }
            })
            .collect();
        println!("  {name}{marker}: {}", ids.join(", "));
        if let Some(description) = &profile.description {
            println!("    {description}");
        }
    }
}
