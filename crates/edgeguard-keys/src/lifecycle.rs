//! Key lifecycle management.
//!
//! [`KeyManager`] drives a key through its states against a [`SecretStore`]:
//!
//! ```text
//! ACTIVE -> ROTATED -> DELETED
//! ```
//!
//! The store has no transactions. Every operation is a sequence of
//! individual calls that stops at the first failure without rolling back.

use crate::generator::{KeyGenerator, KeyPair};
use crate::metadata::{KeyMetadata, KeyStatus};
use crate::naming::SecretNames;
use crate::validator::KeyValidator;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use edgeguard_core::SystemClock;
use edgeguard_types::config::DEFAULT_KEY_SIZE;
use edgeguard_types::{
    bug, CleanupReport, Clock, KeyId, KeyState, KeygenError, Result, SecretStore,
    ValidationError, ValidationField,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates generation, listing, rotation and cleanup of signing keys.
pub struct KeyManager {
    store: Arc<dyn SecretStore>,
    names: SecretNames,
    generator: KeyGenerator,
    validator: KeyValidator,
    clock: Arc<dyn Clock>,
    key_size: usize,
}

impl KeyManager {
    /// Create a manager over `store` using `names`, the system clock and
    /// 32-byte keys.
    pub fn new(store: Arc<dyn SecretStore>, names: SecretNames) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            store,
            names,
            generator: KeyGenerator::new(clock.clone()),
            validator: KeyValidator::default(),
            clock,
            key_size: DEFAULT_KEY_SIZE,
        }
    }

    /// Use `clock` for ids, creation times, rotation times and ages.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.generator = KeyGenerator::new(clock.clone());
        self.clock = clock;
        self
    }

    /// Generate keys of `size` bytes.
    pub fn with_key_size(mut self, size: usize) -> Self {
        self.key_size = size;
        self
    }

    /// The naming scheme in use.
    pub fn names(&self) -> &SecretNames {
        &self.names
    }

    /// Generate, validate and persist a new active key.
    ///
    /// Writes the key material first, then its metadata. If the metadata
    /// write fails the material secret is left behind as an orphan; see
    /// [`KeyManager::find_orphans`].
    pub async fn generate_and_store(&self) -> Result<KeyId> {
        self.generate_and_store_sized(self.key_size).await
    }

    /// Like [`KeyManager::generate_and_store`] with an explicit key size.
    ///
    /// Sizes outside the validator's bounds are refused before any key
    /// material is allocated.
    pub async fn generate_and_store_sized(&self, size: usize) -> Result<KeyId> {
        self.validator.check_size(size)?;
        let key = self.generator.generate(size)?;
        self.validator.validate(&key)?;
        self.store_key(&key).await?;

        info!("Generated key {} ({} bytes)", key.id, key.raw_key.len());
        match KeyId::new(&key.id) {
            Ok(id) => Ok(id),
            Err(e) => bug!("Generator produced an invalid key id {}: {}", key.id, e),
        }
    }

    /// Persist a validated key pair as an active key.
    ///
    /// Refuses with [`KeygenError::IdCollision`] when metadata for the same
    /// id already exists, in which case nothing is written.
    pub async fn store_key(&self, key: &KeyPair) -> Result<()> {
        let key_name = self.names.key_secret(&key.id);
        let metadata_name = self.names.metadata_secret(&key.id);

        match self.store.get(&metadata_name).await {
            Ok(_) => return Err(KeygenError::IdCollision(key.id.clone())),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let metadata = KeyMetadata::new(&key.id, key.created_time).to_json()?;

        debug!("Writing {}", key_name);
        self.store.set(&key_name, &key.encoded_key).await?;
        debug!("Writing {}", metadata_name);
        self.store.set(&metadata_name, &metadata).await?;

        Ok(())
    }

    /// Every key with readable metadata, oldest first.
    ///
    /// Metadata that fails to parse is skipped with a warning. A key's id
    /// always comes from its secret name; an `id` field in the body that
    /// disagrees is replaced.
    pub async fn list_keys(&self) -> Result<Vec<KeyStatus>> {
        let secrets = self.store.list_all().await?;

        let mut keys: Vec<KeyStatus> = secrets
            .iter()
            .filter_map(|(name, value)| {
                let id = self.names.key_id_from_metadata(name)?;
                match KeyStatus::from_json(value) {
                    Ok(status) => Some(Self::with_secret_id(status, &id, name)),
                    Err(e) => {
                        warn!("Skipping unreadable key metadata {}: {}", name, e);
                        None
                    }
                }
            })
            .collect();

        keys.sort_by(|a, b| {
            a.created_time
                .cmp(&b.created_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(keys)
    }

    /// Read the stored status of one key.
    pub async fn key_status(&self, id: &KeyId) -> Result<KeyStatus> {
        let name = self.names.metadata_secret(id.as_str());
        let json = self.store.get(&name).await?;
        Ok(Self::with_secret_id(KeyStatus::from_json(&json)?, id.as_str(), &name))
    }

    fn with_secret_id(mut status: KeyStatus, id: &str, name: &str) -> KeyStatus {
        if !status.id.eq_ignore_ascii_case(id) {
            warn!(
                "Metadata secret {} names key '{}'; using {} from the secret name",
                name, status.id, id
            );
        }
        status.id = id.to_string();
        status
    }

    /// Replace an active key with a freshly generated one.
    ///
    /// The old key's metadata is overwritten with an inactive status pointing
    /// at the new key. Its material stays in the store until cleanup.
    pub async fn rotate_key(&self, old_id: &KeyId) -> Result<KeyId> {
        let old = self.key_status(old_id).await?;
        if !old.state().can_transition_to(KeyState::Rotated) {
            return Err(KeygenError::AlreadyRotated(old_id.to_string()));
        }

        let new_id = self.generate_and_store().await?;

        let rotated = old.rotated(self.clock.now(), new_id.as_str());
        self.store
            .set(&self.names.metadata_secret(old_id.as_str()), &rotated.to_json()?)
            .await?;

        info!("Rotated key {} -> {}", old_id, new_id);
        Ok(new_id)
    }

    /// Delete inactive keys older than `max_age`.
    ///
    /// With `dry_run` nothing is deleted and the report only lists what would
    /// be. Otherwise each eligible key loses its material and then its
    /// metadata. A failure stops the run with
    /// [`KeygenError::PartialCleanup`] carrying exactly which keys were fully
    /// deleted.
    pub async fn cleanup_old_keys(&self, max_age: Duration, dry_run: bool) -> Result<CleanupReport> {
        let keys = self.list_keys().await?;
        let now = self.clock.now();

        let mut report = CleanupReport {
            eligible: eligible_for_cleanup(&keys, max_age, now),
            deleted: Vec::new(),
            dry_run,
        };

        if dry_run {
            info!("Dry run: {} keys eligible for cleanup", report.eligible.len());
            return Ok(report);
        }

        for id in report.eligible.clone() {
            if let Err(e) = self.delete_key(&id).await {
                warn!("Cleanup stopped at key {}: {}", id, e);
                return Err(KeygenError::PartialCleanup {
                    report,
                    source: Box::new(e),
                });
            }
            info!("Deleted key {}", id);
            report.deleted.push(id);
        }

        Ok(report)
    }

    /// Remove both secrets of a key. Material already gone is tolerated so a
    /// retried cleanup can finish a half-deleted key.
    async fn delete_key(&self, id: &str) -> Result<()> {
        match self.store.delete(&self.names.key_secret(id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("Key material for {} already absent", id);
            }
            Err(e) => return Err(e),
        }
        self.store.delete(&self.names.metadata_secret(id)).await
    }

    /// Check that a key's material is present and decodes, returning its
    /// length in bytes.
    pub async fn verify_key(&self, id: &KeyId) -> Result<usize> {
        let encoded = self.store.get(&self.names.key_secret(id.as_str())).await?;
        let raw = STANDARD.decode(encoded.trim()).map_err(|_| {
            ValidationError::new(
                ValidationField::Encoding,
                format!("stored key {} is not valid base64", id),
            )
        })?;
        Ok(raw.len())
    }

    /// Ids of key material secrets that have no metadata secret.
    pub async fn find_orphans(&self) -> Result<Vec<String>> {
        let secrets = self.store.list_all().await?;

        let with_metadata: BTreeSet<String> = secrets
            .keys()
            .filter_map(|name| self.names.key_id_from_metadata(name))
            .collect();

        let orphans: BTreeSet<String> = secrets
            .keys()
            .filter_map(|name| self.names.key_id_from_key_secret(name))
            .filter(|id| !with_metadata.contains(id))
            .collect();

        Ok(orphans.into_iter().collect())
    }
}

/// Ids of inactive keys whose age at `now` is strictly greater than
/// `max_age`, in input order.
pub fn eligible_for_cleanup(keys: &[KeyStatus], max_age: Duration, now: DateTime<Utc>) -> Vec<String> {
    keys.iter()
        .filter(|key| {
            key.state().can_transition_to(KeyState::Deleted) && key.age_at(now) > max_age
        })
        .map(|key| key.id.clone())
        .collect()
}
