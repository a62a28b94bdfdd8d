use std::result::Result as StdResult;

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::services::ServiceError;
use crate::domain::MonthError;
use crate::storage::snapshot::SnapshotError;
use crate::sync::SyncError;

/// Unified error type for core/domain/storage layers.
#[derive(Error, Debug)]
pub enum PerkError {
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Perk not found: {0}")]
    PerkNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error(transparent)]
    Import(#[from] SnapshotError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

pub type Result<T> = StdResult<T, PerkError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] PerkError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl From<std::io::Error> for PerkError {
    fn from(err: std::io::Error) -> Self {
        PerkError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for PerkError {
    fn from(err: serde_json::Error) -> Self {
        PerkError::StorageError(err.to_string())
    }
}

impl From<MonthError> for PerkError {
    fn from(err: MonthError) -> Self {
        PerkError::InvalidInput(err.to_string())
    }
}

impl From<ServiceError> for PerkError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::CardNotFound(id) => PerkError::CardNotFound(id),
            ServiceError::PerkNotFound(id) => PerkError::PerkNotFound(id),
            ServiceError::Invalid(message) => PerkError::InvalidInput(message),
        }
    }
}

impl From<ConfigError> for PerkError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => PerkError::StorageError(io.to_string()),
            other => PerkError::ConfigError(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(PerkError::from(err))
    }
}
