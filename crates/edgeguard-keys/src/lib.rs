//! # EdgeGuard Keys
//!
//! Symmetric signing key lifecycle on top of a [`edgeguard_types::SecretStore`].
//!
//! - **Generation**: random key material with time-derived ids
//! - **Validation**: size, encoding, id and timestamp checks
//! - **Metadata**: the JSON documents stored next to each key
//! - **Lifecycle**: store, list, rotate, age-based cleanup, orphan detection
//!
//! ## Example
//!
//! ```no_run
//! use edgeguard_keys::{KeyManager, SecretNames};
//! use edgeguard_services::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn demo() -> edgeguard_types::Result<()> {
//! let manager = KeyManager::new(Arc::new(MemoryStore::new()), SecretNames::default());
//! let id = manager.generate_and_store().await?;
//! let next = manager.rotate_key(&id).await?;
//! # let _ = next;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod generator;
pub mod lifecycle;
pub mod metadata;
pub mod naming;
pub mod validator;

pub use generator::{generate_key, KeyGenerator, KeyPair};
pub use lifecycle::{eligible_for_cleanup, KeyManager};
pub use metadata::{KeyMetadata, KeyStatus};
pub use naming::{SecretNames, METADATA_SUFFIX};
pub use validator::{KeyValidator, MAX_KEY_SIZE, MIN_KEY_SIZE};
