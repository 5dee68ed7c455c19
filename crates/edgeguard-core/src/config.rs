//! Configuration management for EdgeGuard.
//!
//! This module provides multi-layer configuration support with:
//! - Built-in defaults
//! - File-based configuration (YAML)
//! - Environment variable overrides
//! - Programmatic updates (command-line flags)
//!
//! ## Configuration Layers
//!
//! Configuration values are resolved in this priority order:
//! 1. Programmatically set values (command-line flags)
//! 2. Environment variables
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```no_run
//! use edgeguard_core::config::Config;
//!
//! // Load the configuration file and apply environment overrides
//! let mut config = Config::load(Config::default_path())?.with_env_overrides()?;
//!
//! // Command-line flags win over everything else
//! config.set("doppler.project", "edge-guard")?;
//!
//! // Resolve into typed settings
//! let settings = config.resolve()?;
//! assert_eq!(settings.doppler.project, "edge-guard");
//! # Ok::<(), edgeguard_core::KeygenError>(())
//! ```

use edgeguard_types::config::{MAX_KEY_SIZE, MIN_KEY_SIZE};
use edgeguard_types::{bail, KeyId, KeygenConfig, KeygenError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::time::parse_duration;
use crate::util::{data, fs};

/// Environment variables consulted for overrides, and the key each one sets.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DOPPLER_PROJECT", "doppler.project"),
    ("DOPPLER_CONFIG", "doppler.config"),
    ("EDGEGUARD_DOPPLER_BIN", "doppler.binary"),
    ("EDGEGUARD_KEY_PREFIX", "keys.prefix"),
    ("EDGEGUARD_MAX_AGE", "keys.max_age"),
    ("EDGEGUARD_LOG_LEVEL", "log.level"),
    ("EDGEGUARD_LOG_FORMAT", "log.format"),
];

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values from environment variables
    Environment = 2,
    /// Values set programmatically
    Set = 3,
}

impl ConfigLayer {
    /// All layers, lowest priority first.
    const ASCENDING: [ConfigLayer; 4] = [
        ConfigLayer::Default,
        ConfigLayer::Loaded,
        ConfigLayer::Environment,
        ConfigLayer::Set,
    ];
}

/// Layered configuration store.
///
/// Holds one JSON document per layer and resolves dotted keys through them
/// in priority order. Use [`Config::resolve`] to obtain a validated
/// [`KeygenConfig`].
#[derive(Clone, Debug)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
    file_path: Option<PathBuf>,
}

impl Config {
    /// Create a configuration holding only the built-in defaults.
    pub fn new() -> Self {
        let mut layers = HashMap::new();
        layers.insert(ConfigLayer::Default, default_document());

        Self {
            layers,
            file_path: None,
        }
    }

    /// Create a new configuration from a file path.
    ///
    /// A leading `~` is expanded. If the file doesn't exist, only the
    /// defaults are present.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = fs::expand_path(path);
        let mut config = Self::new();

        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            let value = data::load_yaml_file(&path)
                .map_err(|e| KeygenError::Config(format!("Failed to parse config {}: {}", path.display(), e)))?;

            if !value.is_object() {
                return Err(KeygenError::Config(format!(
                    "Config file {} must contain a mapping at the top level",
                    path.display()
                )));
            }

            config.layers.insert(ConfigLayer::Loaded, value);
        } else {
            debug!("No configuration file at {}, using defaults", path.display());
        }

        config.file_path = Some(path);
        Ok(config)
    }

    /// Get the default path for the configuration file (~/.edgeguard/config).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".edgeguard")
            .join("config")
    }

    /// Path the configuration was loaded from, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        let vars = ENV_OVERRIDES
            .iter()
            .filter_map(|(var, _)| std::env::var(var).ok().map(|value| (var.to_string(), value)));
        self.apply_env(vars)?;
        Ok(self)
    }

    /// Apply overrides from an explicit set of environment variables.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let layer = self
            .layers
            .entry(ConfigLayer::Environment)
            .or_insert_with(|| Value::Object(Default::default()));

        for (var, value) in vars {
            if value.is_empty() {
                continue;
            }
            if let Some((_, key)) = ENV_OVERRIDES.iter().find(|(name, _)| *name == var) {
                debug!("Config override {} from ${}", key, var);
                data::set_path(layer, key, Value::String(value))?;
            }
        }

        Ok(())
    }

    /// Get a configuration value by key, respecting layer priority.
    ///
    /// Returns None if the key doesn't exist in any layer.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        for layer in ConfigLayer::ASCENDING.iter().rev() {
            if let Some(layer_data) = self.layers.get(layer) {
                if let Some(value) = data::get_path(layer_data, key) {
                    if let Ok(typed_value) = serde_json::from_value(value.clone()) {
                        return Some(typed_value);
                    }
                }
            }
        }

        None
    }

    /// Set a configuration value programmatically.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| KeygenError::Config(format!("Failed to serialize value: {}", e)))?;

        let set_layer = self
            .layers
            .entry(ConfigLayer::Set)
            .or_insert_with(|| Value::Object(Default::default()));

        data::set_path(set_layer, key, value)
    }

    /// Get merged data from all layers.
    pub fn merged_data(&self) -> Value {
        let mut merged = Value::Object(serde_json::Map::new());

        for layer in &ConfigLayer::ASCENDING {
            if let Some(layer_data) = self.layers.get(layer) {
                merged = data::deep_merge(merged, layer_data.clone());
            }
        }

        merged
    }

    /// Resolve all layers into validated, typed settings.
    pub fn resolve(&self) -> Result<KeygenConfig> {
        let settings: KeygenConfig = serde_json::from_value(self.merged_data())
            .map_err(|e| KeygenError::Config(format!("Failed to parse configuration: {}", e)))?;
        validate(&settings)?;
        Ok(settings)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_document() -> Value {
    serde_json::to_value(KeygenConfig::default()).unwrap_or_else(|_| Value::Object(Default::default()))
}

/// Check that resolved settings are usable.
pub fn validate(settings: &KeygenConfig) -> Result<()> {
    if settings.doppler.project.trim().is_empty() || settings.doppler.config.trim().is_empty() {
        return Err(KeygenError::Config(
            "Doppler project and config are required (use --project/--config, DOPPLER_PROJECT/DOPPLER_CONFIG, or the config file)".to_string(),
        ));
    }

    if settings.doppler.binary.trim().is_empty() {
        bail!(Config, "Doppler binary path cannot be empty");
    }

    if !KeyId::is_valid(&settings.keys.prefix.to_uppercase()) {
        return Err(KeygenError::Config(format!(
            "Invalid key prefix '{}': must contain only letters, digits, and underscores",
            settings.keys.prefix
        )));
    }

    if !(MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&settings.keys.size) {
        bail!(
            Config,
            "Invalid key size {}: must be between {} and {} bytes",
            settings.keys.size,
            MIN_KEY_SIZE,
            MAX_KEY_SIZE
        );
    }

    match parse_duration(&settings.keys.max_age) {
        Some(age) if age > chrono::Duration::zero() => {}
        _ => {
            return Err(KeygenError::Config(format!(
                "Invalid max_age '{}': expected a positive duration such as 2160h or 90d",
                settings.keys.max_age
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeguard_types::{LogFormat, LogLevel};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_config_layers() {
        let mut config = Config::new();

        config.layers.insert(
            ConfigLayer::Loaded,
            serde_json::json!({"doppler": {"project": "from-file"}}),
        );
        let value: String = config.get("doppler.project").unwrap();
        assert_eq!(value, "from-file");

        config.apply_env(env(&[("DOPPLER_PROJECT", "from-env")])).unwrap();
        let value: String = config.get("doppler.project").unwrap();
        assert_eq!(value, "from-env");

        config.set("doppler.project", "from-flag").unwrap();
        let value: String = config.get("doppler.project").unwrap();
        assert_eq!(value, "from-flag");

        // Defaults still show through for untouched keys
        let prefix: String = config.get("keys.prefix").unwrap();
        assert_eq!(prefix, "JWT_SIGNING_KEY");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "doppler:\n  project: edge-guard\n  config: prd\nkeys:\n  max_age: 30d\nlog:\n  level: debug\n  format: json"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.file_path(), Some(file.path()));

        let settings = config.resolve().unwrap();
        assert_eq!(settings.doppler.project, "edge-guard");
        assert_eq!(settings.doppler.config, "prd");
        assert_eq!(settings.keys.max_age, "30d");
        assert_eq!(settings.keys.size, 32);
        assert_eq!(settings.log.level, LogLevel::Debug);
        assert_eq!(settings.log.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent")).unwrap();
        let prefix: String = config.get("keys.prefix").unwrap();
        assert_eq!(prefix, "JWT_SIGNING_KEY");
    }

    #[test]
    fn test_unknown_env_vars_ignored() {
        let mut config = Config::new();
        config.apply_env(env(&[("HOME", "/root"), ("DOPPLER_CONFIG", "")])).unwrap();
        assert_eq!(config.get::<String>("doppler.config"), Some(String::new()));
    }

    #[test]
    fn test_env_overrides_replace_scalar_layer_values() {
        let mut config = Config::new();
        config.layers.insert(ConfigLayer::Environment, serde_json::json!({"keys": "flat"}));

        config.apply_env(env(&[("EDGEGUARD_MAX_AGE", "30d")])).unwrap();
        let max_age: String = config.get("keys.max_age").unwrap();
        assert_eq!(max_age, "30d");
    }

    #[test]
    fn test_resolve_requires_project_and_config() {
        let mut config = Config::new();
        assert!(matches!(config.resolve(), Err(KeygenError::Config(_))));

        config.set("doppler.project", "edge-guard").unwrap();
        config.set("doppler.config", "dev").unwrap();
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn test_resolve_rejects_bad_values() {
        let mut config = Config::new();
        config.set("doppler.project", "edge-guard").unwrap();
        config.set("doppler.config", "dev").unwrap();

        config.set("keys.max_age", "forever").unwrap();
        assert!(config.resolve().is_err());

        config.set("keys.max_age", "90d").unwrap();
        config.set("keys.prefix", "JWT-KEY").unwrap();
        assert!(config.resolve().is_err());

        config.set("keys.prefix", "JWT_SIGNING_KEY").unwrap();
        config.set("keys.size", 4096).unwrap();
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("Invalid key size 4096"));

        config.set("keys.size", 64).unwrap();
        assert!(config.resolve().is_ok());
    }
}
