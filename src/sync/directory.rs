use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::utils::ensure_dir;
use crate::storage::json_backend::write_atomic;

use super::{RemoteFileStore, SyncError, SyncResult};

/// Remote backed by a plain directory, such as a folder mirrored by a
/// cloud-drive client. File ids are file names inside the directory.
#[derive(Debug, Clone)]
pub struct DirectoryRemote {
    root: PathBuf,
}

impl DirectoryRemote {
    pub fn new(root: impl Into<PathBuf>) -> SyncResult<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> SyncResult<PathBuf> {
        if id.is_empty() || id == "." || id == ".." || id.contains(|c| c == '/' || c == '\\') {
            return Err(SyncError::Remote(format!("invalid remote file id `{id}`")));
        }
        Ok(self.root.join(id))
    }

    fn write(&self, id: &str, content: &str) -> SyncResult<()> {
        let path = self.path_for(id)?;
        write_atomic(&path, content).map_err(|err| SyncError::Remote(err.to_string()))
    }
}

impl RemoteFileStore for DirectoryRemote {
    fn find_by_name(&self, name: &str) -> SyncResult<Option<String>> {
        let path = self.path_for(name)?;
        Ok(path.is_file().then(|| name.to_string()))
    }

    fn create(&self, name: &str, content: &str) -> SyncResult<String> {
        self.write(name, content)?;
        Ok(name.to_string())
    }

    fn update(&self, id: &str, content: &str) -> SyncResult<()> {
        if !self.path_for(id)?.is_file() {
            return Err(SyncError::FileNotFound(id.to_string()));
        }
        self.write(id, content)
    }

    fn read(&self, id: &str) -> SyncResult<String> {
        match fs::read_to_string(self.path_for(id)?) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(SyncError::FileNotFound(id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ids_are_file_names() {
        let temp = TempDir::new().unwrap();
        let remote = DirectoryRemote::new(temp.path().join("drive")).unwrap();

        assert_eq!(remote.find_by_name("backup.json").unwrap(), None);
        let id = remote.create("backup.json", "{}").unwrap();
        assert_eq!(id, "backup.json");
        assert_eq!(remote.find_by_name("backup.json").unwrap(), Some(id.clone()));

        remote.update(&id, "{\"a\":1}").unwrap();
        assert_eq!(remote.read(&id).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn update_of_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let remote = DirectoryRemote::new(temp.path()).unwrap();
        assert!(matches!(
            remote.update("gone.json", "{}"),
            Err(SyncError::FileNotFound(_))
        ));
    }

    #[test]
    fn path_traversal_is_refused() {
        let temp = TempDir::new().unwrap();
        let remote = DirectoryRemote::new(temp.path()).unwrap();
        assert!(matches!(
            remote.read("../secret"),
            Err(SyncError::Remote(_))
        ));
    }
}
