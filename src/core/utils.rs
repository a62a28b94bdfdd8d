use dirs::home_dir;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".perk_core";
const DATA_DIR: &str = "data";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const EXPORTS_DIR: &str = "exports";
const SYNC_STATE_FILE: &str = "sync.json";

/// Environment variable overriding the application home directory.
pub const HOME_ENV: &str = "PERK_CORE_HOME";

/// Resolves the on-disk layout under the application home directory.
pub struct PathResolver;

impl PathResolver {
    /// `PERK_CORE_HOME` when set, otherwise `~/.perk_core`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn data_dir_in(base: &Path) -> PathBuf {
        base.join(DATA_DIR)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn exports_dir_in(base: &Path) -> PathBuf {
        base.join(EXPORTS_DIR)
    }

    pub fn sync_state_file_in(base: &Path) -> PathBuf {
        base.join(SYNC_STATE_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
