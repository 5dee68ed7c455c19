//! Type-safe key identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{KeygenError, Result};

/// Prefix every generated key id starts with.
pub const KEY_ID_PREFIX: &str = "KEY";

/// A validated signing key identifier.
///
/// Key ids become part of secret names, and the secret store only accepts
/// upper-case letters, digits, and underscores. Ids are therefore:
/// - Upper-cased on construction
/// - Non-empty
/// - Restricted to ASCII letters, digits, and underscores
///
/// # Example
///
/// ```
/// use edgeguard_types::KeyId;
///
/// let id = KeyId::new("key_1700000000").unwrap();
/// assert_eq!(id.as_str(), "KEY_1700000000");
///
/// // Invalid ids are rejected
/// assert!(KeyId::new("").is_err());
/// assert!(KeyId::new("key-1700000000").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(String);

impl KeyId {
    /// Create a new validated key id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or contains characters the
    /// store does not accept in secret names.
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let id = id.as_ref().trim().to_uppercase();
        if !Self::is_valid(&id) {
            return Err(KeygenError::Other(format!(
                "Invalid key id '{}': must be non-empty and contain only letters, digits, and underscores",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Build the time-derived id for a key created at `unix_secs`.
    pub fn from_timestamp(unix_secs: i64) -> Self {
        Self(format!("{}_{}", KEY_ID_PREFIX, unix_secs))
    }

    /// Check if an id is valid without allocating.
    pub fn is_valid(id: &str) -> bool {
        !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for KeyId {
    type Err = KeygenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
