use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{RemoteFileStore, SyncError, SyncResult};

#[derive(Debug, Default)]
struct Files {
    next_id: u64,
    by_id: BTreeMap<String, (String, String)>,
}

/// In-process remote. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    files: Arc<Mutex<Files>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.lock().map(|files| files.by_id.len()).unwrap_or(0)
    }

    pub fn delete(&self, id: &str) -> bool {
        self.lock()
            .map(|mut files| files.by_id.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Contents of the first file called `name`.
    pub fn content_of(&self, name: &str) -> Option<String> {
        let files = self.lock().ok()?;
        files
            .by_id
            .values()
            .find(|(file_name, _)| file_name == name)
            .map(|(_, content)| content.clone())
    }

    fn lock(&self) -> SyncResult<MutexGuard<'_, Files>> {
        self.files
            .lock()
            .map_err(|_| SyncError::Remote("memory remote lock poisoned".into()))
    }
}

impl RemoteFileStore for MemoryRemote {
    fn find_by_name(&self, name: &str) -> SyncResult<Option<String>> {
        let files = self.lock()?;
        Ok(files
            .by_id
            .iter()
            .find(|(_, (file_name, _))| file_name == name)
            .map(|(id, _)| id.clone()))
    }

    fn create(&self, name: &str, content: &str) -> SyncResult<String> {
        let mut files = self.lock()?;
        files.next_id += 1;
        let id = format!("mem-{}", files.next_id);
        files
            .by_id
            .insert(id.clone(), (name.to_string(), content.to_string()));
        Ok(id)
    }

    fn update(&self, id: &str, content: &str) -> SyncResult<()> {
        let mut files = self.lock()?;
        match files.by_id.get_mut(id) {
            Some((_, existing)) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(SyncError::FileNotFound(id.to_string())),
        }
    }

    fn read(&self, id: &str) -> SyncResult<String> {
        let files = self.lock()?;
        files
            .by_id
            .get(id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| SyncError::FileNotFound(id.to_string()))
    }

    fn describe(&self) -> String {
        "in-memory remote".to_string()
    }
}
