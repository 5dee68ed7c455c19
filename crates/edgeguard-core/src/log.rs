//! Logging system for EdgeGuard.
//!
//! Installs a `tracing` subscriber writing to stderr, so command output on
//! stdout stays machine-readable. `RUST_LOG` takes precedence over the
//! configured level.

use edgeguard_types::config::LogSettings;
use edgeguard_types::{KeygenError, LogFormat, LogLevel, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter for the given level, honouring `RUST_LOG` when set.
pub fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)))
}

/// Filter directive scoping the level to EdgeGuard crates.
pub fn directive(level: LogLevel) -> String {
    let level = level.as_filter();
    ["edgeguard_core", "edgeguard_services", "edgeguard_keys", "keygen"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize logging from configuration.
///
/// `level_override` (from `-v`/`-q` flags) replaces the configured level.
pub fn init(settings: &LogSettings, level_override: Option<LogLevel>) -> Result<()> {
    let level = level_override.unwrap_or(settings.level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    let installed = match settings.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| KeygenError::Other(format!("Failed to initialize logging: {}", e)))
}
