//! Read-side interfaces to the local record stores
//!
//! Temp IDs and deep contacts are written by external subsystems (the
//! rotation service and the proximity detector). The evaluator only reads
//! them.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use trace_core::{load_records, DeepContactRecord, TempIdRecord};

/// The device's own rotating temp IDs
pub trait TempIdStore: Send + Sync {
    fn temp_ids(&self) -> Vec<TempIdRecord>;
}

/// Peer temp IDs observed during proximity events
pub trait DeepContactLog: Send + Sync {
    fn deep_contacts(&self) -> Vec<DeepContactRecord>;
}

/// In-memory temp ID store
#[derive(Debug, Default)]
pub struct MemoryTempIdStore {
    records: RwLock<Vec<TempIdRecord>>,
}

impl MemoryTempIdStore {
    pub fn new(records: Vec<TempIdRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Load records from a JSON array file
    pub fn from_file(path: impl AsRef<Path>) -> trace_core::Result<Self> {
        Ok(Self::new(load_records(path)?))
    }

    /// Add a newly rotated temp ID; earlier records are kept, not mutated
    pub fn rotate(&self, record: TempIdRecord) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Replace the full record set
    pub fn replace(&self, records: Vec<TempIdRecord>) {
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = records;
    }
}

impl TempIdStore for MemoryTempIdStore {
    fn temp_ids(&self) -> Vec<TempIdRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// In-memory, append-only deep contact log
#[derive(Debug, Default)]
pub struct MemoryDeepContactLog {
    records: RwLock<Vec<DeepContactRecord>>,
}

impl MemoryDeepContactLog {
    pub fn new(records: Vec<DeepContactRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Load records from a JSON array file
    pub fn from_file(path: impl AsRef<Path>) -> trace_core::Result<Self> {
        Ok(Self::new(load_records(path)?))
    }

    pub fn append(&self, record: DeepContactRecord) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeepContactLog for MemoryDeepContactLog {
    fn deep_contacts(&self) -> Vec<DeepContactRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_previous_records() {
        let store = MemoryTempIdStore::new(vec![TempIdRecord::new("A", 0, 100)]);
        store.rotate(TempIdRecord::new("B", 100, 200));

        let ids: Vec<_> = store.temp_ids().into_iter().map(|r| r.temp_id).collect();
        assert_eq!(ids, vec!["A", "B"]);

        store.replace(vec![]);
        assert!(store.temp_ids().is_empty());
    }

    #[test]
    fn test_contact_log_append() {
        let log = MemoryDeepContactLog::default();
        assert!(log.is_empty());
        log.append(DeepContactRecord::new("Z"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.deep_contacts()[0].temp_id, "Z");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp_ids.json");
        std::fs::write(&path, r#"[{"temp_id":"A","start_time":1,"expiry_time":2}]"#).unwrap();

        let store = MemoryTempIdStore::from_file(&path).unwrap();
        assert_eq!(store.temp_ids(), vec![TempIdRecord::new("A", 1, 2)]);
    }
}
