//! Configuration module for the replay scanner.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides (applied by the commands themselves)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `WRA_` and use double underscores
//! to separate nested levels:
//! - `WRA_SCAN__WORKERS=8` sets `scan.workers`
//! - `WRA_CACHE__ENABLED=false` sets `cache.enabled`
//! - `WRA_WATCH__DEBOUNCE_MS=1000` sets `watch.debounce_ms`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application directory under the platform config and data dirs.
pub const APP_DIR: &str = "warno-replays";
pub const SETTINGS_FILE: &str = "settings.toml";
pub const ENV_PREFIX: &str = "WRA_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Scanning and worker pool settings
    #[serde(default)]
    pub scan: ScanSettings,

    /// Parse cache settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// Directory watch settings
    #[serde(default)]
    pub watch: WatchSettings,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScanSettings {
    /// Number of parser workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the work queue between discovery and workers
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Replay file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Save directories scanned when none are given on the command line
    #[serde(default)]
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Overrides the platform data directory. The crate version is
    /// always appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WatchSettings {
    /// Quiet period before a new replay is scanned
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Broadcast channel capacity for file-added events
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Logging configuration.
///
/// `default` is the global level; `modules` overrides it per target, e.g.
/// `warno_replays::scan = "debug"`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_workers() -> usize {
    num_cpus::get()
}
fn default_queue_size() -> usize {
    100
}
fn default_extension() -> String {
    "rpl3".to_string()
}
fn default_true() -> bool {
    true
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_channel_capacity() -> usize {
    256
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            scan: ScanSettings::default(),
            cache: CacheSettings::default(),
            watch: WatchSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_size: default_queue_size(),
            extension: default_extension(),
            directories: Vec::new(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None,
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources, reading the default settings
    /// file when it exists.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        match Self::default_config_path() {
            Some(path) => Self::load_from(path),
            None => Self::figment(None).extract().map_err(Box::new),
        }
    }

    /// Load configuration with `path` as the TOML layer.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(Some(path.as_ref()))
            .extract()
            .map_err(Box::new)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        // Double underscore separates nested levels; single underscores
        // stay inside field names
        figment.merge(
            Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
        )
    }

    /// `<config dir>/warno-replays/settings.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Write a default settings file at `path`.
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn init_config_file(path: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        if path.exists() && !force {
            return Err(format!(
                "Configuration file already exists at: {}\nUse --force to overwrite",
                path.display()
            )
            .into());
        }

        Settings::default().save(path)?;
        Ok(path.to_path_buf())
    }
}
