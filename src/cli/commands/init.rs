//! Init and Config commands.

use std::path::Path;

use anyhow::anyhow;

use crate::cache::resolve_cache_root;
use crate::config::Settings;

/// Run init command - create configuration file.
pub fn run_init(config_path: &Path, force: bool) -> anyhow::Result<()> {
    let path = Settings::init_config_file(config_path, force).map_err(|e| anyhow!("{e}"))?;
    println!("Created configuration file at: {}", path.display());
    println!("Edit this file to customize your settings.");
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings, config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    match config_path {
        Some(path) if path.exists() => println!("# file: {}", path.display()),
        Some(path) => println!("# file: {} (not found, defaults)", path.display()),
        None => println!("# file: none (defaults)"),
    }

    match resolve_cache_root(config.cache.root.as_deref()) {
        Ok(root) => println!("# cache root: {}", root.display()),
        Err(e) => println!("# cache root: unavailable ({e})"),
    }
    println!();

    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
