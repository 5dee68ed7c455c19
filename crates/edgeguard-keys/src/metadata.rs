//! Persisted key metadata.
//!
//! Metadata lives next to the key material as a JSON document. A fresh key
//! gets a [`KeyMetadata`]; rotation overwrites it with the [`KeyStatus`]
//! superset. Listing always parses into [`KeyStatus`], which reads both.

use crate::validator::is_zero_time;
use chrono::{DateTime, Duration, Utc};
use edgeguard_types::{KeyState, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata written when a key is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Key identifier
    pub id: String,
    /// Generation instant
    pub created_at: DateTime<Utc>,
    /// Whether this is the current signing key
    pub active: bool,
    /// Lineage version, starting at 1
    pub version: u32,
}

impl KeyMetadata {
    /// Metadata for a freshly generated key.
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            active: true,
            version: 1,
        }
    }

    /// Serialize to the stored JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Full lifecycle status of a key, as stored after rotation and as read back
/// when listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
    /// Key identifier
    pub id: String,
    /// Generation instant
    #[serde(alias = "created_at")]
    pub created_time: DateTime<Utc>,
    /// Whether this is the current signing key
    pub active: bool,
    /// Lineage version
    #[serde(default = "default_version")]
    pub version: u32,
    /// When the key was superseded
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_time")]
    pub rotated_time: Option<DateTime<Utc>>,
    /// Id of the key that superseded this one
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_id")]
    pub rotated_from_id: Option<String>,
    /// Last recorded use of the key
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_time")]
    pub last_used: Option<DateTime<Utc>>,
    /// Flag reserved for external tooling
    #[serde(default)]
    pub marked_for_deletion: bool,
}

fn default_version() -> u32 {
    1
}

/// Zero timestamps from older writers mean "unset".
fn optional_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<DateTime<Utc>> = Option::deserialize(deserializer)?;
    Ok(value.filter(|ts| !is_zero_time(ts)))
}

fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|id| !id.is_empty()))
}

impl KeyStatus {
    /// Parse a stored metadata document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the stored JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Lifecycle state implied by the stored fields.
    pub fn state(&self) -> KeyState {
        if self.active {
            KeyState::Active
        } else {
            KeyState::Rotated
        }
    }

    /// The instant a key's age is measured from: last use, else rotation,
    /// else creation.
    pub fn age_reference(&self) -> DateTime<Utc> {
        self.last_used
            .or(self.rotated_time)
            .unwrap_or(self.created_time)
    }

    /// Age of the key at `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.age_reference())
    }

    /// This status after being superseded by `new_id` at `now`.
    pub fn rotated(&self, now: DateTime<Utc>, new_id: impl Into<String>) -> Self {
        Self {
            active: false,
            rotated_time: Some(now),
            rotated_from_id: Some(new_id.into()),
            ..self.clone()
        }
    }
}

impl From<KeyMetadata> for KeyStatus {
    fn from(metadata: KeyMetadata) -> Self {
        Self {
            id: metadata.id,
            created_time: metadata.created_at,
            active: metadata.active,
            version: metadata.version,
            rotated_time: None,
            rotated_from_id: None,
            last_used: None,
            marked_for_deletion: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_metadata_json() {
        let json = KeyMetadata::new("KEY_1700000000", at(1_700_000_000)).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"id":"KEY_1700000000","created_at":"2023-11-14T22:13:20Z","active":true,"version":1}"#
        );

        let status = KeyStatus::from_json(&json).unwrap();
        assert_eq!(status.created_time, at(1_700_000_000));
        assert_eq!(status.state(), KeyState::Active);
        assert_eq!(status.rotated_time, None);
        assert!(!status.marked_for_deletion);
    }

    #[test]
    fn test_status_reads_legacy_documents() {
        let status = KeyStatus::from_json(
            r#"{"id":"KEY_1","created_at":"2024-01-01T00:00:00.123456789-05:00","active":false,"version":2,
                "rotated_time":"0001-01-01T00:00:00Z","rotated_from_id":"","last_used":null}"#,
        )
        .unwrap();
        assert_eq!(status.version, 2);
        assert_eq!(status.rotated_time, None);
        assert_eq!(status.rotated_from_id, None);
        assert_eq!(status.last_used, None);
        assert_eq!(status.state(), KeyState::Rotated);

        let no_version =
            KeyStatus::from_json(r#"{"id":"KEY_2","created_time":"2024-01-01T00:00:00Z","active":true}"#).unwrap();
        assert_eq!(no_version.version, 1);

        assert!(KeyStatus::from_json(r#"{"id":"KEY_3","active":true}"#).is_err());
        assert!(KeyStatus::from_json("not json").is_err());
    }

    #[test]
    fn test_rotated() {
        let status: KeyStatus = KeyMetadata::new("KEY_1", at(1_000)).into();
        let rotated = status.rotated(at(2_000), "KEY_2");

        assert!(!rotated.active);
        assert_eq!(rotated.created_time, at(1_000));
        assert_eq!(rotated.rotated_time, Some(at(2_000)));
        assert_eq!(rotated.rotated_from_id.as_deref(), Some("KEY_2"));

        let json = rotated.to_json().unwrap();
        assert!(json.contains(r#""created_time":"1970-01-01T00:16:40Z""#));
        assert!(!json.contains("last_used"));
        assert_eq!(KeyStatus::from_json(&json).unwrap(), rotated);
    }

    #[test]
    fn test_age_precedence() {
        let mut status: KeyStatus = KeyMetadata::new("KEY_1", at(1_000)).into();
        assert_eq!(status.age_reference(), at(1_000));

        status.rotated_time = Some(at(2_000));
        assert_eq!(status.age_reference(), at(2_000));

        status.last_used = Some(at(3_000));
        assert_eq!(status.age_reference(), at(3_000));
        assert_eq!(status.age_at(at(3_500)), Duration::seconds(500));
    }
}
