//! Configuration module for live-mirror
//!
//! Provides configuration loading, validation, and default settings
//! for the engine and its driver.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{load_config, ConfigLoader, DEFAULT_CONFIG_PATH};
pub use validator::{validate_config, ConfigValidator, MAX_ENTITY_CAPACITY};

// Re-export the main configuration structures
pub use loader::{AddressConfig, Config, EngineConfig, LoggingConfig, ProcessConfig};

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_from_io() {
        use std::io;
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_error: ConfigError = io_error.into();
        assert!(matches!(config_error, ConfigError::Io(_)));
    }

    #[test]
    fn test_engine_settings_from_config() {
        let mut config = Config::default();
        config.engine.failure_threshold = 7;
        config.engine.mesh_cooldown_ms = 500;

        let settings = config.engine_settings();
        assert_eq!(settings.failure_threshold, 7);
        assert_eq!(settings.mesh_cooldown, std::time::Duration::from_millis(500));
        assert_eq!(settings.layout, config.layout);
    }
}
