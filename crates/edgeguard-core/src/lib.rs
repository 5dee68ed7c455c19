//! # EdgeGuard Core
//!
//! Core utilities, configuration management, logging, and common functionality
//! for the EdgeGuard signing key manager.
//!
//! This crate provides:
//!
//! - **Configuration**: Multi-layer configuration system (defaults, file, flags, environment)
//! - **Logging**: `tracing` subscriber setup in pretty, compact, or JSON form
//! - **Process Execution**: Subprocess runner used by CLI-backed secret stores
//! - **Time Utilities**: Clocks, duration parsing, and formatting
//! - **Data Structures**: Deep merging and dotted-path lookups
//!
//! ## Example
//!
//! ```no_run
//! use edgeguard_core::config::Config;
//!
//! // Load configuration and resolve it into typed settings
//! let config = Config::load("~/.edgeguard/config")?.with_env_overrides()?;
//! let settings = config.resolve()?;
//!
//! // Initialize logging
//! edgeguard_core::log::init(&settings.log, None)?;
//! # Ok::<(), edgeguard_core::KeygenError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod util;
pub mod time;

// Re-export commonly used items
pub use config::Config;
pub use time::{ManualClock, SystemClock};
pub use edgeguard_types::{KeygenError, Result};
