use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::errors::PerkError;

use super::{Record, Result, StorageBackend};

/// Volatile backend for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<Record, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record with raw contents, valid JSON or not.
    pub fn with_record(self, record: Record, contents: impl Into<String>) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.insert(record, contents.into());
        }
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Record, String>>> {
        self.records
            .lock()
            .map_err(|_| PerkError::StorageError("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, record: Record) -> Result<Option<String>> {
        Ok(self.lock()?.get(&record).cloned())
    }

    fn write(&self, record: Record, contents: &str) -> Result<()> {
        self.lock()?.insert(record, contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::UsageLedger;
    use crate::storage::{load_or_default, save_record};

    #[test]
    fn corrupt_record_loads_as_default() {
        let storage = MemoryStorage::new().with_record(Record::Usage, "{not json");
        let usage: UsageLedger = load_or_default(&storage, Record::Usage);
        assert!(usage.is_empty());
    }

    #[test]
    fn saved_record_reads_back() {
        let storage = MemoryStorage::new();
        let mut usage = UsageLedger::new();
        usage.increment(&crate::domain::bucket_key(
            "p",
            &crate::domain::Cadence::Annually,
            crate::domain::CalendarMonth::new(2025, 4).unwrap(),
        ));
        save_record(&storage, Record::Usage, &usage).unwrap();
        let loaded: UsageLedger = load_or_default(&storage, Record::Usage);
        assert_eq!(loaded, usage);

        storage.clear().unwrap();
        assert!(storage.read(Record::Usage).unwrap().is_none());
    }
}
