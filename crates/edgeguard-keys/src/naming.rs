//! Secret naming convention.
//!
//! ```text
//! {PREFIX}_{ID}            key material (base64)
//! {PREFIX}_{ID}_METADATA   metadata (JSON)
//! ```
//!
//! All names are upper-case.

use edgeguard_types::config::DEFAULT_KEY_PREFIX;

/// Suffix marking a metadata secret.
pub const METADATA_SUFFIX: &str = "_METADATA";

/// Maps key ids to secret names under a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretNames {
    prefix: String,
}

impl SecretNames {
    /// Create a naming scheme for `prefix`.
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().trim_end_matches('_').to_uppercase(),
        }
    }

    /// The normalized prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the key material secret for `id`.
    pub fn key_secret(&self, id: &str) -> String {
        format!("{}_{}", self.prefix, id).to_uppercase()
    }

    /// Name of the metadata secret for `id`.
    pub fn metadata_secret(&self, id: &str) -> String {
        format!("{}{}", self.key_secret(id), METADATA_SUFFIX)
    }

    /// Extract the key id from a metadata secret name.
    pub fn key_id_from_metadata(&self, name: &str) -> Option<String> {
        let name = name.to_uppercase();
        let id = self.strip_prefix(&name)?.strip_suffix(METADATA_SUFFIX)?;
        (!id.is_empty()).then(|| id.to_string())
    }

    /// Extract the key id from a key material secret name.
    ///
    /// Metadata names are not key material and yield `None`.
    pub fn key_id_from_key_secret(&self, name: &str) -> Option<String> {
        let name = name.to_uppercase();
        if name.ends_with(METADATA_SUFFIX) {
            return None;
        }
        let id = self.strip_prefix(&name)?;
        (!id.is_empty()).then(|| id.to_string())
    }

    fn strip_prefix<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.prefix.as_str())?.strip_prefix('_')
    }
}

impl Default for SecretNames {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
