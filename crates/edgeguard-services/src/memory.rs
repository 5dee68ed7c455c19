//! In-memory secret store.
//!
//! Behaves like the Doppler backend as seen through [`SecretStore`]: names
//! are upper-cased, empty values read as missing, and the whole namespace
//! can be listed. Every call is journaled, and individual operations can be
//! made to fail so partial-failure paths can be exercised.

use async_trait::async_trait;
use edgeguard_types::{KeygenError, Result, SecretStore};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};

/// Kind of store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// Single secret read
    Get,
    /// Create or overwrite
    Set,
    /// Removal
    Delete,
    /// Whole-namespace download
    ListAll,
}

/// A journaled call against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `get(name)`
    Get(String),
    /// `set(name, _)`
    Set(String),
    /// `delete(name)`
    Delete(String),
    /// `list_all()`
    ListAll,
}

/// Secret store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: Mutex<BTreeMap<String, String>>,
    journal: Mutex<Vec<StoreCall>>,
    failures: Mutex<HashSet<(StoreOp, String)>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with secrets.
    pub fn with_secrets<I, K, V>(secrets: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.secrets.lock();
            for (name, value) in secrets {
                map.insert(name.as_ref().to_uppercase(), value.into());
            }
        }
        store
    }

    /// Make every future `op` on `name` fail. Use an empty name with
    /// [`StoreOp::ListAll`].
    pub fn fail_on(&self, op: StoreOp, name: &str) {
        self.failures.lock().insert((op, name.to_uppercase()));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Copy of the current namespace.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.secrets.lock().clone()
    }

    /// Whether a secret exists.
    pub fn contains(&self, name: &str) -> bool {
        self.secrets.lock().contains_key(&name.to_uppercase())
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.journal.lock().clone()
    }

    /// Names passed to `delete`, in order.
    pub fn deletes(&self) -> Vec<String> {
        self.journal
            .lock()
            .iter()
            .filter_map(|call| match call {
                StoreCall::Delete(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget the call journal.
    pub fn clear_calls(&self) {
        self.journal.lock().clear();
    }

    fn record(&self, call: StoreCall) {
        self.journal.lock().push(call);
    }

    fn check(&self, op: StoreOp, name: &str) -> Result<()> {
        if self.failures.lock().contains(&(op, name.to_string())) {
            return Err(KeygenError::Store(format!(
                "injected {:?} failure for {}",
                op,
                if name.is_empty() { "<all>" } else { name }
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<String> {
        let name = name.to_uppercase();
        self.record(StoreCall::Get(name.clone()));
        self.check(StoreOp::Get, &name)?;

        match self.secrets.lock().get(&name) {
            Some(value) if !value.is_empty() => Ok(value.clone()),
            _ => Err(KeygenError::NotFound(name)),
        }
    }

    async fn set(&self, name: &str, value: &str) -> Result<()> {
        let name = name.to_uppercase();
        self.record(StoreCall::Set(name.clone()));
        self.check(StoreOp::Set, &name)?;

        self.secrets.lock().insert(name, value.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let name = name.to_uppercase();
        self.record(StoreCall::Delete(name.clone()));
        self.check(StoreOp::Delete, &name)?;

        match self.secrets.lock().remove(&name) {
            Some(_) => Ok(()),
            None => Err(KeygenError::NotFound(name)),
        }
    }

    async fn list_all(&self) -> Result<BTreeMap<String, String>> {
        self.record(StoreCall::ListAll);
        self.check(StoreOp::ListAll, "")?;

        Ok(self.snapshot())
    }
}
