//! Core trait definitions for EdgeGuard abstractions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use crate::errors::Result;

/// Trait for flat, string-keyed secret storage backends.
///
/// Implementers expose a single namespace (for Doppler, one project/config
/// pair) with no transactions and no schema. Each call is independent; the
/// lifecycle manager issues them one after another and never assumes two
/// writes land together.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read a secret value.
    ///
    /// Returns `KeygenError::NotFound` when the secret is absent or empty.
    async fn get(&self, name: &str) -> Result<String>;

    /// Create or overwrite a secret.
    async fn set(&self, name: &str, value: &str) -> Result<()>;

    /// Delete a secret.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Download every secret in the namespace as a name -> value map.
    async fn list_all(&self) -> Result<BTreeMap<String, String>>;
}

/// Source of the current time.
///
/// Key ids, creation stamps, rotation stamps, and cleanup ages all read the
/// clock through this trait so tests can drive a simulated one.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}
