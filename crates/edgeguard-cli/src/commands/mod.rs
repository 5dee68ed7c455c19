//! CLI command implementations.

pub mod cleanup;
pub mod generate;
pub mod list;
pub mod orphans;
pub mod rotate;
pub mod verify;

use crate::cli::Cli;
use anyhow::{Context, Result};
use edgeguard_core::config::Config;
use edgeguard_keys::{KeyManager, SecretNames};
use edgeguard_services::DopplerClient;
use edgeguard_types::{KeyId, KeygenConfig, SecretStore};
use std::sync::Arc;

/// Resolved settings plus a key manager bound to the configured store.
pub struct Session {
    pub settings: KeygenConfig,
    pub manager: KeyManager,
}

impl Session {
    /// Resolve configuration, start logging and connect to Doppler.
    pub fn open(cli: &Cli) -> Result<Self> {
        let settings = load_settings(cli)?;
        edgeguard_core::log::init(&settings.log, cli.log_level())?;

        let client = DopplerClient::new(settings.doppler.clone())?;
        tracing::debug!(
            "Using Doppler project {} config {}",
            settings.doppler.project,
            settings.doppler.config
        );

        Ok(Self::new(settings, Arc::new(client)))
    }

    /// Build a session over an arbitrary store.
    pub fn new(settings: KeygenConfig, store: Arc<dyn SecretStore>) -> Self {
        let manager = KeyManager::new(store, SecretNames::new(&settings.keys.prefix))
            .with_key_size(settings.keys.size);
        Self { settings, manager }
    }
}

/// Layer the config file, environment and command-line flags into settings.
pub fn load_settings(cli: &Cli) -> Result<KeygenConfig> {
    let path = cli.config_file.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        .with_env_overrides()?;

    if let Some(project) = &cli.project {
        config.set("doppler.project", project)?;
    }
    if let Some(doppler_config) = &cli.config {
        config.set("doppler.config", doppler_config)?;
    }
    if let Some(prefix) = &cli.prefix {
        config.set("keys.prefix", prefix)?;
    }

    Ok(config.resolve()?)
}

/// Parse a key id given on the command line.
pub fn parse_key_id(raw: &str) -> Result<KeyId> {
    KeyId::new(raw).with_context(|| format!("Invalid key ID '{}'", raw))
}
