//! # EdgeGuard Types
//!
//! Core types, traits, and enums shared across all EdgeGuard crates.
//!
//! This crate provides the fundamental building blocks for the signing key
//! manager, including:
//!
//! - A validated key identifier type
//! - Common enums for log levels, log formats, and key lifecycle states
//! - The `SecretStore` and `Clock` traits that the lifecycle manager drives
//! - Error types and result aliases
//! - Configuration structures
//!
//! ## Example
//!
//! ```
//! use edgeguard_types::{KeyId, KeyState};
//!
//! // Key ids are normalized to the upper-case form the store expects
//! let id = KeyId::new("key_1700000000").unwrap();
//! assert_eq!(id.as_str(), "KEY_1700000000");
//!
//! assert!(KeyState::Active.can_transition_to(KeyState::Rotated));
//! assert!(!KeyState::Deleted.can_transition_to(KeyState::Active));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod traits;
pub mod config;
pub mod report;

// Re-export common types for convenience
pub use errors::{KeygenError, Result, ValidationError, ValidationField};
pub use identifiers::KeyId;
pub use enums::{KeyState, LogFormat, LogLevel};
pub use traits::{Clock, SecretStore};
pub use config::KeygenConfig;
pub use report::CleanupReport;
