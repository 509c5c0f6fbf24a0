//! Configuration validator for live-mirror
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, EngineConfig, LoggingConfig};
use crate::engine::TableStorage;
use crate::game::{ActorCommonData, ObjectLayout};

/// Largest accepted entity capacity
pub const MAX_ENTITY_CAPACITY: usize = 1_000_000;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_engine(&config.engine)?;
        Self::validate_layout(&config.layout)?;
        Self::validate_logging(&config.logging)?;

        // Surfaces unknown locations and unparsable addresses
        config.address_table()?;
        Ok(())
    }

    /// Validates engine configuration
    fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
        if engine.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "Poll interval must be at least 1 ms".to_string(),
            ));
        }

        if engine.entity_capacity == 0 || engine.entity_capacity > MAX_ENTITY_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "Entity capacity must be between 1 and {}",
                MAX_ENTITY_CAPACITY
            )));
        }

        if engine.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "Failure threshold must be at least 1".to_string(),
            ));
        }

        if engine.max_geometry_bytes == 0 {
            return Err(ConfigError::Invalid(
                "Maximum geometry size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates record layout
    fn validate_layout(layout: &ObjectLayout) -> Result<(), ConfigError> {
        let table = &layout.table;
        if table.storage == TableStorage::Contiguous && table.stride < ActorCommonData::SIZE {
            return Err(ConfigError::Invalid(format!(
                "Record stride {} is smaller than the {}-byte record",
                table.stride,
                ActorCommonData::SIZE
            )));
        }

        if layout.level_area_name_len == 0 {
            return Err(ConfigError::Invalid(
                "Level area name length must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
