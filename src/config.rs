//! Configuration module for the score feed.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SHOTWATCH_` and use double
//! underscores to separate nested levels:
//! - `SHOTWATCH_WATCH__POLL_INTERVAL_MS=250` sets `watch.poll_interval_ms`
//! - `SHOTWATCH_SOURCE__DIR=/mnt/device` sets `source.dir`
//! - `SHOTWATCH_PUBLISH__HOST="Nordstrand SKL"` sets `publish.host`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::decode::TextEncoding;
use crate::source::INDEX_NAME;
use crate::watcher::{BusyPolicy, StagingOptions};

/// Directory holding the settings file.
pub const CONFIG_DIR: &str = ".shotwatch";

const ENV_PREFIX: &str = "SHOTWATCH_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Where the device's files live
    #[serde(default)]
    pub source: SourceConfig,

    /// Polling and staging
    #[serde(default)]
    pub watch: WatchConfig,

    /// Published tree settings
    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    /// Directory the scoring device writes into
    #[serde(default = "default_source_dir")]
    pub dir: PathBuf,

    /// Exact file name of the index file
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Encoding of the index and series files
    #[serde(default)]
    pub encoding: TextEncoding,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WatchConfig {
    /// Modification-time polling interval per file
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// What to do with a change seen while a read is in flight
    #[serde(default)]
    pub busy_policy: BusyPolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    /// Label stamped on every published range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Trees buffered per subscriber before the oldest are dropped
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Log levels, overridden by `RUST_LOG` when set.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level applied to everything not listed in `modules`
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `shotwatch::watcher = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_index_name() -> String {
    INDEX_NAME.to_string()
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_channel_capacity() -> usize {
    64
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            source: SourceConfig::default(),
            watch: WatchConfig::default(),
            publish: PublishConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: default_source_dir(),
            index_name: default_index_name(),
            encoding: TextEncoding::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            busy_policy: BusyPolicy::default(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            host: None,
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

impl WatchConfig {
    pub fn staging_options(&self) -> StagingOptions {
        StagingOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            busy_policy: self.busy_policy,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting, single underscore stays
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by walking up from the current directory
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file under `root`
    pub fn init_config_file(
        root: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.as_ref().join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
