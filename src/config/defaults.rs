//! Default configuration values for live-mirror

use crate::address::KNOWN_BUILD;
use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub process: ProcessDefaults,
    pub engine: EngineDefaults,
    pub addresses: AddressDefaults,
    pub logging: LoggingDefaults,
}

/// Default process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDefaults {
    pub pointer_width: u8,
}

/// Default engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDefaults {
    pub poll_interval_ms: u64,
    pub mesh_cooldown_ms: u64,
    pub entity_capacity: usize,
    pub failure_threshold: u32,
    pub max_geometry_bytes: usize,
}

/// Default address table selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressDefaults {
    pub build: String,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        process: ProcessDefaults { pointer_width: 32 },
        engine: EngineDefaults {
            poll_interval_ms: 50,
            mesh_cooldown_ms: 3000,
            entity_capacity: 8192,
            failure_threshold: 50,
            max_geometry_bytes: 16 * 1024 * 1024, // 16MB
        },
        addresses: AddressDefaults {
            build: KNOWN_BUILD.to_string(),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
