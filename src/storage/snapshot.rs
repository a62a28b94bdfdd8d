//! Portable backup document holding the full tracker state.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{Card, Perk};
use crate::ledger::{Registry, UsageLedger};

pub const SNAPSHOT_VERSION: &str = "1.0";
const REQUIRED_FIELDS: [&str; 3] = ["cards", "perks", "usage"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Invalid backup file format: {0}")]
    Malformed(String),
    #[error("Invalid backup file format: missing `{0}`")]
    MissingField(&'static str),
    #[error("Backup version {0} is newer than this build supports")]
    UnsupportedVersion(String),
    #[error("could not read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub cards: Vec<Card>,
    pub perks: Vec<Perk>,
    pub usage: UsageLedger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Snapshot {
    pub fn new(registry: &Registry, usage: &UsageLedger, exported_at: DateTime<Utc>) -> Self {
        Self {
            cards: registry.cards().to_vec(),
            perks: registry.perks().to_vec(),
            usage: usage.clone(),
            export_date: Some(Value::String(
                exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            version: Some(SNAPSHOT_VERSION.to_string()),
        }
    }

    /// Parses and validates a backup document.
    ///
    /// `cards`, `perks` and `usage` must be present and non-null. `exportDate`
    /// and `version` are informational and may be absent.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| SnapshotError::Malformed(err.to_string()))?;
        let Some(object) = value.as_object() else {
            return Err(SnapshotError::Malformed("expected a JSON object".into()));
        };
        for field in REQUIRED_FIELDS {
            if object.get(field).map_or(true, Value::is_null) {
                return Err(SnapshotError::MissingField(field));
            }
        }
        let snapshot: Snapshot =
            serde_json::from_value(value).map_err(|err| SnapshotError::Malformed(err.to_string()))?;
        if let Some(version) = snapshot.version.as_deref() {
            ensure_version_support(version)?;
        }
        Ok(snapshot)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Splits the snapshot into the registry and ledger it describes.
    pub fn into_parts(self) -> (Registry, UsageLedger) {
        (Registry::from_parts(self.cards, self.perks), self.usage)
    }

    pub fn default_file_name(date: NaiveDate) -> String {
        format!("credit-card-perks-backup-{}.json", date.format("%Y-%m-%d"))
    }
}

fn ensure_version_support(version: &str) -> Result<(), SnapshotError> {
    let major = version
        .split('.')
        .next()
        .and_then(|major| major.trim().parse::<u32>().ok());
    match major {
        Some(major) if major > 1 => Err(SnapshotError::UnsupportedVersion(version.to_string())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn export_date_uses_millisecond_utc_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap();
        let snapshot = Snapshot::new(&Registry::new(), &UsageLedger::new(), at);
        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("\"exportDate\": \"2026-10-15T08:00:00.000Z\""));
        assert!(json.contains("\"version\": \"1.0\""));
    }

    #[test]
    fn missing_or_null_sections_are_rejected() {
        let err = Snapshot::from_json(r#"{"cards":[],"perks":[]}"#).unwrap_err();
        assert_eq!(err, SnapshotError::MissingField("usage"));
        let err = Snapshot::from_json(r#"{"cards":null,"perks":[],"usage":{}}"#).unwrap_err();
        assert_eq!(err, SnapshotError::MissingField("cards"));
        assert!(err.to_string().starts_with("Invalid backup file format"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            Snapshot::from_json("not json"),
            Err(SnapshotError::Malformed(_))
        ));
        assert!(matches!(
            Snapshot::from_json("[1,2]"),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn metadata_is_optional_and_loosely_typed() {
        let snapshot =
            Snapshot::from_json(r#"{"cards":[],"perks":[],"usage":{},"exportDate":1700000000000}"#)
                .unwrap();
        assert!(snapshot.version.is_none());
        assert!(snapshot.export_date.is_some());
    }

    #[test]
    fn newer_major_version_is_rejected() {
        let raw = r#"{"cards":[],"perks":[],"usage":{},"version":"2.0"}"#;
        let err = Snapshot::from_json(raw).unwrap_err();
        assert_eq!(err, SnapshotError::UnsupportedVersion("2.0".into()));
    }

    #[test]
    fn default_file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            Snapshot::default_file_name(date),
            "credit-card-perks-backup-2026-10-16.json"
        );
    }
}
