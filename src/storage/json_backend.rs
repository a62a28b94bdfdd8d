use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::core::utils::{ensure_dir, PathResolver};

use super::{
    snapshot::{Snapshot, SnapshotError},
    Record, Result, StorageBackend,
};

const RECORD_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// File-backed storage keeping one JSON document per record under `<home>/data/`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    data_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let data_dir = PathResolver::data_dir_in(&app_root);
        ensure_dir(&data_dir)?;
        Ok(Self {
            root: app_root,
            data_dir,
        })
    }

    pub fn record_path(&self, record: Record) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", record.name(), RECORD_EXTENSION))
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }
}

impl StorageBackend for JsonStorage {
    fn read(&self, record: Record) -> Result<Option<String>> {
        match fs::read_to_string(self.record_path(record)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, record: Record, contents: &str) -> Result<()> {
        write_atomic(&self.record_path(record), contents)
    }

    fn clear(&self) -> Result<()> {
        for record in Record::ALL {
            let path = self.record_path(record);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "record removed"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.root)
    }
}

/// Writes a snapshot as pretty JSON to an arbitrary path.
pub fn save_snapshot_to_path(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json = snapshot.to_json_pretty()?;
    write_atomic(path, &json)
}

/// Reads and validates a snapshot from an arbitrary path.
pub fn load_snapshot_from_path(path: &Path) -> Result<Snapshot> {
    let data = fs::read_to_string(path).map_err(|err| SnapshotError::Unreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    Ok(Snapshot::from_json(&data)?)
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes through a sibling temp file and renames it over `path`.
pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cadence, Card, Perk};
    use crate::ledger::Registry;
    use crate::storage::{load_or_default, save_record};
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
        (storage, temp)
    }

    fn sample_perks() -> Vec<Perk> {
        vec![Perk {
            id: "p1".into(),
            card_id: "c1".into(),
            name: "Uber credit".into(),
            description: None,
            limit: 1,
            cadence: Cadence::Monthly,
        }]
    }

    #[test]
    fn records_live_under_data_dir() {
        let (storage, temp) = storage_with_temp_dir();
        assert_eq!(
            storage.record_path(Record::Cards),
            temp.path().join("data").join("cards.json")
        );
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _temp) = storage_with_temp_dir();
        let perks = sample_perks();
        save_record(&storage, Record::Perks, &perks).unwrap();
        let loaded: Vec<Perk> = load_or_default(&storage, Record::Perks);
        assert_eq!(loaded, perks);
        assert!(!tmp_path(&storage.record_path(Record::Perks)).exists());
    }

    #[test]
    fn missing_and_corrupt_records_fall_back_to_empty() {
        let (storage, _temp) = storage_with_temp_dir();
        let cards: Vec<Card> = load_or_default(&storage, Record::Cards);
        assert!(cards.is_empty());

        fs::write(storage.record_path(Record::Cards), "[{\"id\":").unwrap();
        let cards: Vec<Card> = load_or_default(&storage, Record::Cards);
        assert!(cards.is_empty());
    }

    #[test]
    fn clear_removes_every_record() {
        let (storage, _temp) = storage_with_temp_dir();
        save_record(&storage, Record::Perks, &sample_perks()).unwrap();
        save_record(&storage, Record::Cards, &Registry::new().cards()).unwrap();
        storage.clear().unwrap();
        for record in Record::ALL {
            assert!(storage.read(record).unwrap().is_none());
        }
    }
}
