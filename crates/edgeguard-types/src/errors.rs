//! Error types for key lifecycle operations.

use std::fmt;
use thiserror::Error;

use crate::report::CleanupReport;

/// The main error type for EdgeGuard operations.
///
/// Every component-level failure is surfaced through this enum. Nothing in
/// the library retries: the variant tells the caller which step failed and
/// the message carries whatever diagnostic output was available.
#[derive(Error, Debug)]
pub enum KeygenError {
    /// The random source could not supply enough entropy
    #[error("Key generation error: {0}")]
    Generation(String),

    /// A generated key failed a structural check
    #[error("Key validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The external secret store call failed or returned unparseable output
    #[error("Secret store error: {0}")]
    Store(String),

    /// The requested secret does not exist (or the store returned nothing)
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// A freshly generated key id is already present in the store
    #[error("Key ID collision: a key with ID {0} already exists in the store")]
    IdCollision(String),

    /// Rotation was requested for a key that is already inactive
    #[error("Key {0} is already inactive and cannot be rotated again")]
    AlreadyRotated(String),

    /// A deletion failed part way through cleanup
    ///
    /// The report lists every eligible id and exactly those whose key
    /// material and metadata were both removed before the failure.
    #[error(
        "Cleanup stopped after deleting {} of {} eligible keys: {source}",
        .report.deleted.len(),
        .report.eligible.len()
    )]
    PartialCleanup {
        /// What was planned and what was actually deleted
        report: CleanupReport,
        /// The deletion failure that stopped the run
        #[source]
        source: Box<KeygenError>,
    },

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Internal bug - should never happen in production
    #[error("Bug detected: {0}\n\nThis is an internal error. Please report this issue at:\nhttps://github.com/the0xsec/edge-guard-keygen/issues")]
    Bug(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl KeygenError {
    /// Whether this error means "the secret is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, KeygenError::NotFound(_))
    }
}

/// A specialized Result type for EdgeGuard operations.
pub type Result<T> = std::result::Result<T, KeygenError>;

/// The key property a validation check failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationField {
    /// Raw key length outside the allowed bounds
    KeySize,
    /// Encoded key is not valid base64
    Encoding,
    /// Key identifier is empty
    KeyId,
    /// Creation timestamp is unset
    CreatedAt,
}

impl ValidationField {
    /// The field name as reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationField::KeySize => "key_size",
            ValidationField::Encoding => "encoding",
            ValidationField::KeyId => "key_id",
            ValidationField::CreatedAt => "created_at",
        }
    }
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural defect found in a generated key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Which property failed
    pub field: ValidationField,
    /// Human-readable description
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: ValidationField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Helper macro to create and return a KeygenError::Bug
///
/// This should be used for conditions that should never occur
/// in normal operation and indicate a bug in EdgeGuard itself.
///
/// # Example
///
/// ```ignore
/// if some_impossible_condition {
///     bug!("This should never happen: {:?}", condition);
/// }
/// ```
#[macro_export]
macro_rules! bug {
    ($msg:expr) => {
        return Err($crate::KeygenError::Bug($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::KeygenError::Bug(format!($fmt, $($arg)*)))
    };
}

/// Helper macro to bail out with a KeygenError
///
/// This is used for expected error conditions.
///
/// # Example
///
/// ```ignore
/// if project.is_empty() {
///     bail!(Config, "Doppler project is required");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::KeygenError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::KeygenError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::KeygenError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::KeygenError::Other(format!($fmt, $($arg)*)))
    };
}
