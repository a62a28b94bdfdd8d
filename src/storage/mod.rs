pub mod json_backend;
pub mod memory;
pub mod snapshot;

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::core::errors::PerkError;

pub type Result<T> = std::result::Result<T, PerkError>;

/// The independently persisted pieces of tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Record {
    Cards,
    Perks,
    Usage,
}

impl Record {
    pub const ALL: [Record; 3] = [Record::Cards, Record::Perks, Record::Usage];

    pub fn name(self) -> &'static str {
        match self {
            Record::Cards => "cards",
            Record::Perks => "perks",
            Record::Usage => "usage",
        }
    }
}

/// Abstraction over persistence backends holding the three tracker records.
///
/// Each record is read once at startup and overwritten wholesale whenever it
/// changes.
pub trait StorageBackend: Send + Sync {
    /// Returns the raw record contents, or `None` when nothing was stored yet.
    fn read(&self, record: Record) -> Result<Option<String>>;
    fn write(&self, record: Record, contents: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;

    /// Location of the backend on disk, when it has one.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Loads and decodes a record, falling back to `T::default()` when it is
/// missing or unreadable.
pub fn load_or_default<T>(backend: &dyn StorageBackend, record: Record) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match backend.read(record) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::error!(record = record.name(), error = %err, "failed to read record");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(
                record = record.name(),
                error = %err,
                "record is corrupt, starting empty"
            );
            T::default()
        }
    }
}

pub fn save_record<T>(backend: &dyn StorageBackend, record: Record, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    backend.write(record, &json)?;
    tracing::debug!(record = record.name(), bytes = json.len(), "record saved");
    Ok(())
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_VERSION};
