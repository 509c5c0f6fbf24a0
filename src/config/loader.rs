//! Configuration loader for live-mirror
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use crate::address::{AddressTable, Location, PREFERRED_IMAGE_BASE};
use crate::core::types::{Address, ProcessId};
use crate::engine::EngineSettings;
use crate::game::ObjectLayout;
use crate::memory::PointerWidth;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// File read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "live-mirror.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_process")]
    pub process: ProcessConfig,

    #[serde(default = "default_engine")]
    pub engine: EngineConfig,

    #[serde(default)]
    pub layout: ObjectLayout,

    #[serde(default = "default_addresses")]
    pub addresses: AddressConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Target process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<ProcessId>,
    #[serde(default = "default_pointer_width")]
    pub pointer_width: PointerWidth,
    /// Actual load base of the image, when it differs from the preferred one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base: Option<String>,
}

/// Engine timing and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_mesh_cooldown_ms")]
    pub mesh_cooldown_ms: u64,
    #[serde(default = "default_entity_capacity")]
    pub entity_capacity: usize,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_max_geometry_bytes")]
    pub max_geometry_bytes: usize,
}

/// Address table selection and per-location overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressConfig {
    #[serde(default = "default_build")]
    pub build: String,
    /// Location name -> address string; an empty string removes the entry
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    /// Builds the address table: the built-in table for the known build (or
    /// an empty one), overrides applied, then relocated if an image base is set
    pub fn address_table(&self) -> Result<AddressTable, ConfigError> {
        let mut table = if self.addresses.build == crate::address::KNOWN_BUILD {
            AddressTable::known_build().clone()
        } else {
            AddressTable::new(self.addresses.build.clone(), PREFERRED_IMAGE_BASE)
        };

        for (name, value) in &self.addresses.overrides {
            let location = Location::from_str(name)
                .map_err(|_| ConfigError::Invalid(format!("Unknown location: {}", name)))?;

            if value.trim().is_empty() {
                table.remove(location);
            } else {
                let address = Address::from_str(value)
                    .map_err(|e| ConfigError::Invalid(format!("{} for {}", e, name)))?;
                table.insert(location, address);
            }
        }

        match self.image_base()? {
            Some(base) if base != table.image_base() => Ok(table.relocate(base)),
            _ => Ok(table),
        }
    }

    /// Parsed `process.image_base`
    pub fn image_base(&self) -> Result<Option<Address>, ConfigError> {
        self.process
            .image_base
            .as_deref()
            .map(|value| {
                Address::from_str(value)
                    .map_err(|e| ConfigError::Invalid(format!("{} for image_base", e)))
            })
            .transpose()
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            pointer_width: self.process.pointer_width,
            entity_capacity: self.engine.entity_capacity,
            mesh_cooldown: Duration::from_millis(self.engine.mesh_cooldown_ms),
            failure_threshold: self.engine.failure_threshold,
            max_geometry_bytes: self.engine.max_geometry_bytes,
            layout: self.layout.clone(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.engine.poll_interval_ms)
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file can't be used
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|_| Config::default())
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from `path`, falling back to defaults only when the
/// file does not exist
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    match ConfigLoader::new(path).load() {
        Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
        result => result,
    }
}

// Default functions for serde
fn default_process() -> ProcessConfig {
    ProcessConfig {
        pid: None,
        pointer_width: default_pointer_width(),
        image_base: None,
    }
}

fn default_engine() -> EngineConfig {
    let defaults = default_config();
    EngineConfig {
        poll_interval_ms: defaults.engine.poll_interval_ms,
        mesh_cooldown_ms: defaults.engine.mesh_cooldown_ms,
        entity_capacity: defaults.engine.entity_capacity,
        failure_threshold: defaults.engine.failure_threshold,
        max_geometry_bytes: defaults.engine.max_geometry_bytes,
    }
}

fn default_addresses() -> AddressConfig {
    AddressConfig {
        build: default_build(),
        overrides: BTreeMap::new(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
    }
}

// Individual field defaults
fn default_pointer_width() -> PointerWidth {
    PointerWidth::try_from(default_config().process.pointer_width).unwrap_or_default()
}

fn default_poll_interval_ms() -> u64 {
    default_config().engine.poll_interval_ms
}

fn default_mesh_cooldown_ms() -> u64 {
    default_config().engine.mesh_cooldown_ms
}

fn default_entity_capacity() -> usize {
    default_config().engine.entity_capacity
}

fn default_failure_threshold() -> u32 {
    default_config().engine.failure_threshold
}

fn default_max_geometry_bytes() -> usize {
    default_config().engine.max_geometry_bytes
}

fn default_build() -> String {
    default_config().addresses.build
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            process: default_process(),
            engine: default_engine(),
            layout: ObjectLayout::default(),
            addresses: default_addresses(),
            logging: default_logging(),
        }
    }
}
