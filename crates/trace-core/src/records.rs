//! Local records produced by external subsystems
//!
//! Temp IDs come from the rotation service, deep contacts from the proximity
//! detector. Both are read-only here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One of the device's own rotating temp IDs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempIdRecord {
    pub temp_id: String,
    /// Start of validity window (Unix seconds)
    #[serde(default)]
    pub start_time: u64,
    /// End of validity window, exclusive (Unix seconds)
    #[serde(default = "far_future")]
    pub expiry_time: u64,
}

fn far_future() -> u64 {
    u64::MAX
}

impl TempIdRecord {
    pub fn new(temp_id: impl Into<String>, start_time: u64, expiry_time: u64) -> Self {
        Self {
            temp_id: temp_id.into(),
            start_time,
            expiry_time,
        }
    }

    /// Whether the record was valid at `now` (Unix seconds)
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.start_time <= now && now < self.expiry_time
    }
}

/// A peer temp ID observed during a proximity event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepContactRecord {
    pub temp_id: String,
    #[serde(default)]
    pub start_time: Option<u64>,
    #[serde(default)]
    pub end_time: Option<u64>,
}

impl DeepContactRecord {
    pub fn new(temp_id: impl Into<String>) -> Self {
        Self {
            temp_id: temp_id.into(),
            start_time: None,
            end_time: None,
        }
    }
}

/// Load a JSON array of records from a file
pub fn load_records<T: DeserializeOwned>(path: impl AsRef<std::path::Path>) -> crate::Result<Vec<T>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let records = serde_json::from_str(&content)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_window() {
        let record = TempIdRecord::new("A", 100, 200);
        assert!(!record.is_valid_at(99));
        assert!(record.is_valid_at(100));
        assert!(record.is_valid_at(199));
        assert!(!record.is_valid_at(200));
    }

    #[test]
    fn test_window_defaults() {
        let record: TempIdRecord = serde_json::from_str(r#"{"temp_id":"A"}"#).unwrap();
        assert_eq!(record.start_time, 0);
        assert!(record.is_valid_at(u64::MAX - 1));
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(
            &path,
            r#"[{"temp_id":"Z","start_time":10,"end_time":20},{"temp_id":"Y"}]"#,
        )
        .unwrap();

        let contacts: Vec<DeepContactRecord> = load_records(&path).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].end_time, Some(20));
        assert_eq!(contacts[1], DeepContactRecord::new("Y"));
    }

    #[test]
    fn test_load_records_missing_file() {
        let result: crate::Result<Vec<TempIdRecord>> = load_records("/nonexistent/temp_ids.json");
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
