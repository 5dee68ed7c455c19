//! Structural checks on generated key material.

use crate::generator::KeyPair;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use edgeguard_types::{ValidationError, ValidationField};

pub use edgeguard_types::config::{MAX_KEY_SIZE, MIN_KEY_SIZE};

/// Key validator with configurable size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValidator {
    /// Minimum raw key length
    pub min_size: usize,
    /// Maximum raw key length
    pub max_size: usize,
}

impl KeyValidator {
    /// Create a validator accepting raw keys of `min_size..=max_size` bytes.
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self { min_size, max_size }
    }

    /// Check a raw key length against the bounds.
    pub fn check_size(&self, size: usize) -> Result<(), ValidationError> {
        if size < self.min_size {
            return Err(ValidationError::new(
                ValidationField::KeySize,
                format!("key size {} is below minimum required size {}", size, self.min_size),
            ));
        }

        if size > self.max_size {
            return Err(ValidationError::new(
                ValidationField::KeySize,
                format!("key size {} exceeds maximum allowed size {}", size, self.max_size),
            ));
        }

        Ok(())
    }

    /// Check a key pair. The first failing check is reported:
    /// size lower bound, size upper bound, encoding, id, creation time.
    pub fn validate(&self, key: &KeyPair) -> Result<(), ValidationError> {
        self.check_size(key.raw_key.len())?;

        if STANDARD.decode(&key.encoded_key).is_err() {
            return Err(ValidationError::new(
                ValidationField::Encoding,
                "invalid base64 encoding",
            ));
        }

        if key.id.is_empty() {
            return Err(ValidationError::new(
                ValidationField::KeyId,
                "key ID cannot be empty",
            ));
        }

        if is_zero_time(&key.created_time) {
            return Err(ValidationError::new(
                ValidationField::CreatedAt,
                "creation timestamp is not set",
            ));
        }

        Ok(())
    }
}

impl Default for KeyValidator {
    fn default() -> Self {
        Self::new(MIN_KEY_SIZE, MAX_KEY_SIZE)
    }
}

impl KeyPair {
    /// Validate with the default 32..=64 byte bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        KeyValidator::default().validate(self)
    }
}

/// Whether a timestamp is unset.
///
/// Both the Unix epoch (`DateTime::default()`) and `0001-01-01T00:00:00Z`,
/// the zero value older metadata was written with, count as unset.
pub fn is_zero_time(ts: &DateTime<Utc>) -> bool {
    *ts == DateTime::<Utc>::default() || ts.timestamp() == GO_ZERO_TIME_SECS
}

/// Unix seconds of `0001-01-01T00:00:00Z`.
const GO_ZERO_TIME_SECS: i64 = -62_135_596_800;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_key;
    use proptest::prelude::*;

    fn valid_key() -> KeyPair {
        generate_key(32).unwrap()
    }

    #[test]
    fn test_accepts_generated_key() {
        assert_eq!(valid_key().validate(), Ok(()));
        assert_eq!(generate_key(64).unwrap().validate(), Ok(()));
    }

    #[test]
    fn test_size_bounds() {
        let err = generate_key(16).unwrap().validate().unwrap_err();
        assert_eq!(err.field, ValidationField::KeySize);
        assert_eq!(err.message, "key size 16 is below minimum required size 32");

        let err = generate_key(65).unwrap().validate().unwrap_err();
        assert_eq!(err.field, ValidationField::KeySize);
        assert_eq!(err.message, "key size 65 exceeds maximum allowed size 64");
        assert_eq!(err.to_string(), "key_size: key size 65 exceeds maximum allowed size 64");
    }

    #[test]
    fn test_encoding() {
        let mut key = valid_key();
        key.encoded_key = "not base64!".to_string();
        assert_eq!(key.validate().unwrap_err().field, ValidationField::Encoding);
    }

    #[test]
    fn test_empty_id() {
        let mut key = valid_key();
        key.id.clear();
        assert_eq!(key.validate().unwrap_err().field, ValidationField::KeyId);
    }

    #[test]
    fn test_zero_time() {
        let mut key = valid_key();
        key.created_time = DateTime::<Utc>::default();
        assert_eq!(key.validate().unwrap_err().field, ValidationField::CreatedAt);

        key.created_time = DateTime::from_timestamp(GO_ZERO_TIME_SECS, 0).unwrap();
        assert_eq!(key.validate().unwrap_err().field, ValidationField::CreatedAt);
    }

    #[test]
    fn test_first_failure_wins() {
        let key = KeyPair {
            id: String::new(),
            raw_key: vec![0u8; 8],
            encoded_key: "%%%".to_string(),
            created_time: DateTime::<Utc>::default(),
        };
        assert_eq!(key.validate().unwrap_err().field, ValidationField::KeySize);

        let key = KeyPair {
            raw_key: vec![0u8; 32],
            ..key
        };
        assert_eq!(key.validate().unwrap_err().field, ValidationField::Encoding);
    }

    #[test]
    fn test_custom_bounds() {
        let validator = KeyValidator::new(16, 16);
        assert!(validator.validate(&generate_key(16).unwrap()).is_ok());
        assert!(validator.validate(&valid_key()).is_err());
    }

    #[test]
    fn test_check_size_bounds() {
        let validator = KeyValidator::default();
        assert!(validator.check_size(32).is_ok());
        assert!(validator.check_size(64).is_ok());
        assert_eq!(validator.check_size(31).unwrap_err().field, ValidationField::KeySize);

        let err = validator.check_size(usize::MAX).unwrap_err();
        assert_eq!(err.field, ValidationField::KeySize);
        assert!(err.to_string().contains("exceeds maximum allowed size 64"));
    }

    proptest! {
        #[test]
        fn prop_validation_is_deterministic(size in 0usize..128) {
            let key = generate_key(size).unwrap();
            let first = key.validate();
            prop_assert_eq!(first.clone(), key.validate());
            prop_assert_eq!(first.is_ok(), (MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&size));
        }
    }
}
