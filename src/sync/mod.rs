//! Remote backup of the full tracker state.
//!
//! A [`SyncManager`] pushes and pulls [`Snapshot`] documents through a
//! [`RemoteFileStore`]. It remembers the remote file id and the auto-sync flag
//! across sessions in a small JSON state file.

pub mod directory;
pub mod memory;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::json_backend::write_atomic;
use crate::storage::{Snapshot, SnapshotError};

pub use directory::DirectoryRemote;
pub use memory::MemoryRemote;

/// Name of the remote backup file when none is configured.
pub const DEFAULT_REMOTE_FILE_NAME: &str = "credit-card-perks-data.json";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Not connected to a remote store")]
    NotConnected,
    #[error("No backup found on the remote")]
    NoRemoteBackup,
    #[error("Remote file `{0}` no longer exists")]
    FileNotFound(String),
    #[error("Remote error: {0}")]
    Remote(String),
    #[error("Sync state error: {0}")]
    State(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Minimal file API of a remote drive.
pub trait RemoteFileStore: Send {
    fn find_by_name(&self, name: &str) -> SyncResult<Option<String>>;
    /// Creates a file and returns its id.
    fn create(&self, name: &str, content: &str) -> SyncResult<String>;
    fn update(&self, id: &str, content: &str) -> SyncResult<()>;
    fn read(&self, id: &str) -> SyncResult<String>;
    /// Human readable location used in status output.
    fn describe(&self) -> String;
}

/// What is remembered between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default)]
    pub auto_sync: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl SyncState {
    /// Reads the state file; a missing or unreadable file yields the default state.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to read sync state");
                return Self::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "sync state is corrupt, resetting"
            );
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> SyncResult<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|err| SyncError::State(err.to_string()))?;
        write_atomic(path, &json).map_err(|err| SyncError::State(err.to_string()))
    }
}

pub struct SyncManager {
    store: Box<dyn RemoteFileStore>,
    file_name: String,
    state: SyncState,
    state_path: Option<PathBuf>,
}

impl SyncManager {
    pub fn new(store: Box<dyn RemoteFileStore>, file_name: impl Into<String>) -> Self {
        Self {
            store,
            file_name: file_name.into(),
            state: SyncState::default(),
            state_path: None,
        }
    }

    /// Persists state changes to `path`, starting from `state`.
    pub fn with_state(mut self, state: SyncState, path: impl Into<PathBuf>) -> Self {
        self.state = state;
        self.state_path = Some(path.into());
        self
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn describe_remote(&self) -> String {
        self.store.describe()
    }

    pub fn auto_sync(&self) -> bool {
        self.state.auto_sync
    }

    pub fn set_auto_sync(&mut self, enabled: bool) -> SyncResult<()> {
        self.state.auto_sync = enabled;
        self.save_state()
    }

    /// Uploads `snapshot`, updating the remembered file or creating a new one.
    ///
    /// When the remembered file has vanished the id is forgotten so the next
    /// push creates a fresh file.
    pub fn push(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> SyncResult<String> {
        let content = snapshot
            .to_json_pretty()
            .map_err(|err| SyncError::State(err.to_string()))?;

        let file_id = match self.state.file_id.clone() {
            Some(id) => match self.store.update(&id, &content) {
                Ok(()) => id,
                Err(SyncError::FileNotFound(missing)) => {
                    tracing::warn!(file_id = %missing, "remembered remote file is gone");
                    self.state.file_id = None;
                    self.save_state()?;
                    return Err(SyncError::FileNotFound(missing));
                }
                Err(err) => return Err(err),
            },
            None => self.store.create(&self.file_name, &content)?,
        };

        self.state.file_id = Some(file_id.clone());
        self.state.last_sync = Some(now);
        self.save_state()?;
        tracing::info!(file_id = %file_id, "pushed snapshot to remote");
        Ok(file_id)
    }

    /// Downloads and validates the remote snapshot. Local state is not touched here.
    pub fn pull(&mut self, now: DateTime<Utc>) -> SyncResult<Snapshot> {
        let file_id = match self.state.file_id.clone() {
            Some(id) => id,
            None => self
                .store
                .find_by_name(&self.file_name)?
                .ok_or(SyncError::NoRemoteBackup)?,
        };
        let raw = self.store.read(&file_id)?;
        let snapshot = Snapshot::from_json(&raw)?;

        self.state.file_id = Some(file_id.clone());
        self.state.last_sync = Some(now);
        self.save_state()?;
        tracing::info!(file_id = %file_id, "pulled snapshot from remote");
        Ok(snapshot)
    }

    /// Forgets the remote file id and turns auto-sync off.
    pub fn disconnect(&mut self) -> SyncResult<()> {
        self.state = SyncState::default();
        self.save_state()
    }

    fn save_state(&self) -> SyncResult<()> {
        match &self.state_path {
            Some(path) => self.state.save(path),
            None => Ok(()),
        }
    }
}
