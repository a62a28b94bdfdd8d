pub mod card_service;
pub mod checklist_service;
pub mod perk_service;
pub mod usage_service;

pub use card_service::CardService;
pub use checklist_service::{
    Checklist, ChecklistGroup, ChecklistItem, ChecklistService, ToggleOutcome,
};
pub use perk_service::{PerkListing, PerkService, UNKNOWN_CARD_LABEL};
pub use usage_service::UsageService;

use crate::domain::{is_hex_color, new_entity_id};
use crate::ledger::Registry;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Perk not found: {0}")]
    PerkNotFound(String),
    #[error("{0}")]
    Invalid(String),
}

/// Generates an identifier not yet used by any card or perk in the registry.
pub(crate) fn unique_id(registry: &Registry) -> String {
    loop {
        let candidate = new_entity_id();
        if !registry.contains_id(&candidate) {
            return candidate;
        }
    }
}

pub(crate) fn validate_name(kind: &str, candidate: &str) -> ServiceResult<()> {
    if candidate.trim().is_empty() {
        Err(ServiceError::Invalid(format!("{kind} name is required")))
    } else {
        Ok(())
    }
}

pub(crate) fn validate_color(candidate: &str) -> ServiceResult<()> {
    if is_hex_color(candidate) {
        Ok(())
    } else {
        Err(ServiceError::Invalid(format!(
            "Card color must look like #rrggbb, got `{candidate}`"
        )))
    }
}

#[cfg(test)]
mod tests;
