//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use crate::enums::{LogFormat, LogLevel};

/// Default secret name prefix for signing keys.
pub const DEFAULT_KEY_PREFIX: &str = "JWT_SIGNING_KEY";

/// Default key size in bytes (256 bits).
pub const DEFAULT_KEY_SIZE: usize = 32;

/// Smallest accepted raw key length, in bytes.
pub const MIN_KEY_SIZE: usize = 32;

/// Largest accepted raw key length, in bytes.
pub const MAX_KEY_SIZE: usize = 64;

/// Default retention window for inactive keys (90 days).
pub const DEFAULT_MAX_AGE: &str = "2160h";

/// Complete tool configuration, deserialized from the merged config layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeygenConfig {
    /// Secret store target
    #[serde(default)]
    pub doppler: DopplerSettings,
    /// Key generation and retention settings
    #[serde(default)]
    pub keys: KeySettings,
    /// Log output settings
    #[serde(default)]
    pub log: LogSettings,
}

/// Doppler CLI target configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DopplerSettings {
    /// Doppler project name
    #[serde(default)]
    pub project: String,
    /// Doppler config name (e.g., "prd")
    #[serde(default)]
    pub config: String,
    /// Path to the doppler binary
    #[serde(default = "default_binary")]
    pub binary: String,
}

fn default_binary() -> String {
    "doppler".to_string()
}

impl Default for DopplerSettings {
    fn default() -> Self {
        Self {
            project: String::new(),
            config: String::new(),
            binary: default_binary(),
        }
    }
}

/// Key generation and retention configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySettings {
    /// Secret name prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Raw key size in bytes
    #[serde(default = "default_size")]
    pub size: usize,
    /// Retention window for inactive keys, as a duration string
    #[serde(default = "default_max_age")]
    pub max_age: String,
}

fn default_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_size() -> usize {
    DEFAULT_KEY_SIZE
}

fn default_max_age() -> String {
    DEFAULT_MAX_AGE.to_string()
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            size: default_size(),
            max_age: default_max_age(),
        }
    }
}

/// Log configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Minimum level emitted when RUST_LOG is unset
    #[serde(default)]
    pub level: LogLevel,
    /// Log format (pretty, json, compact)
    #[serde(default)]
    pub format: LogFormat,
}
