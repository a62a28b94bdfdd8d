use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::core::utils::{ensure_dir, PathResolver};
use crate::domain::{is_hex_color, DEFAULT_CARD_COLOR};
use crate::storage::json_backend::write_atomic;
use crate::sync::DEFAULT_REMOTE_FILE_NAME;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Unknown configuration key `{0}`")]
    UnknownKey(String),

    #[error("Invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_card_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_dir: Option<PathBuf>,
    pub remote_file_name: String,
    pub screen_reader_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_card_color: DEFAULT_CARD_COLOR.into(),
            remote_dir: None,
            remote_file_name: DEFAULT_REMOTE_FILE_NAME.into(),
            screen_reader_mode: false,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 4] = [
        "default_card_color",
        "remote_dir",
        "remote_file_name",
        "screen_reader_mode",
    ];

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("default_card_color", self.default_card_color.clone()),
            (
                "remote_dir",
                self.remote_dir
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(|| "(not set)".into()),
            ),
            ("remote_file_name", self.remote_file_name.clone()),
            ("screen_reader_mode", self.screen_reader_mode.to_string()),
        ]
    }

    /// Updates one setting from its textual form. `none` clears `remote_dir`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "default_card_color" => {
                if !is_hex_color(value) {
                    return Err(ConfigError::InvalidValue {
                        key: "default_card_color",
                        value: value.into(),
                        reason: "expected a color like #3b82f6",
                    });
                }
                self.default_card_color = value.to_ascii_lowercase();
            }
            "remote_dir" => {
                self.remote_dir = match value {
                    "" | "none" => None,
                    path => Some(PathBuf::from(path)),
                };
            }
            "remote_file_name" => {
                if value.is_empty() || value.contains(|c| c == '/' || c == '\\') {
                    return Err(ConfigError::InvalidValue {
                        key: "remote_file_name",
                        value: value.into(),
                        reason: "expected a plain file name",
                    });
                }
                self.remote_file_name = value.into();
            }
            "screen_reader_mode" => {
                self.screen_reader_mode = parse_flag(value).ok_or(ConfigError::InvalidValue {
                    key: "screen_reader_mode",
                    value: value.into(),
                    reason: "expected on or off",
                })?;
            }
            other => return Err(ConfigError::UnknownKey(other.into())),
        }
        Ok(())
    }
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_and_reload() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("remote_dir", "/mnt/drive").unwrap();
        config.set("screen_reader_mode", "on").unwrap();
        manager.save(&config).unwrap();

        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(manager.path(), temp.path().join("config").join("config.json"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"screen_reader_mode":true}"#).unwrap();
        let config = manager.load().unwrap();
        assert!(config.screen_reader_mode);
        assert_eq!(config.remote_file_name, DEFAULT_REMOTE_FILE_NAME);
    }

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("default_card_color", "blue"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        config.set("default_card_color", "#ABCDEF").unwrap();
        assert_eq!(config.default_card_color, "#abcdef");
        config.set("remote_dir", "none").unwrap();
        assert!(config.remote_dir.is_none());
    }
}
