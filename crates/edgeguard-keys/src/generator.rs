//! Signing key material generation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use edgeguard_core::SystemClock;
use edgeguard_types::{Clock, KeyId, KeygenError, Result};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::sync::Arc;

/// Freshly generated key material.
///
/// Transient: produced by [`KeyGenerator`], checked by the validator, then
/// written to the store. `raw_key` is never logged; the `Debug` output only
/// shows its length.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct KeyPair {
    /// Time-derived identifier (`KEY_<unix seconds>`)
    pub id: String,
    /// Raw key bytes
    pub raw_key: Vec<u8>,
    /// Standard base64 encoding of `raw_key`
    pub encoded_key: String,
    /// Generation instant
    pub created_time: DateTime<Utc>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("raw_key", &format_args!("<{} bytes>", self.raw_key.len()))
            .field("created_time", &self.created_time)
            .finish()
    }
}

/// Key material generator.
///
/// Ids are derived from the clock at one-second resolution, so two keys
/// generated within the same second share an id. The generator does not
/// prevent this; the lifecycle manager refuses to store a colliding id.
#[derive(Clone)]
pub struct KeyGenerator {
    clock: Arc<dyn Clock>,
}

impl KeyGenerator {
    /// Create a generator reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Generate `size` bytes of key material from the OS random source.
    pub fn generate(&self, size: usize) -> Result<KeyPair> {
        self.generate_with(&mut OsRng, size)
    }

    /// Generate key material from an explicit random source.
    pub fn generate_with<R>(&self, rng: &mut R, size: usize) -> Result<KeyPair>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let mut raw_key = Vec::new();
        raw_key.try_reserve_exact(size).map_err(|e| {
            KeygenError::Generation(format!("cannot allocate {} bytes of key material: {}", size, e))
        })?;
        raw_key.resize(size, 0);
        rng.try_fill_bytes(&mut raw_key)
            .map_err(|e| KeygenError::Generation(format!("failed to generate random key: {}", e)))?;

        let created_time = self.clock.now();
        let id = KeyId::from_timestamp(created_time.timestamp()).into_inner();
        let encoded_key = STANDARD.encode(&raw_key);

        Ok(KeyPair {
            id,
            raw_key,
            encoded_key,
            created_time,
        })
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl fmt::Debug for KeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGenerator").finish_non_exhaustive()
    }
}

/// Generate a key of `size` bytes using the system clock.
pub fn generate_key(size: usize) -> Result<KeyPair> {
    KeyGenerator::default().generate(size)
}
