use crate::domain::{NewPerk, Perk, PerkPatch, DEFAULT_CARD_COLOR};
use crate::ledger::Registry;

use super::{unique_id, validate_name, ServiceError, ServiceResult};

/// Label shown for perks whose card no longer exists.
pub const UNKNOWN_CARD_LABEL: &str = "Unknown";

/// A perk paired with the card details needed to list it.
#[derive(Debug, Clone, PartialEq)]
pub struct PerkListing<'a> {
    pub perk: &'a Perk,
    pub card_name: &'a str,
    pub card_color: &'a str,
    pub card_exists: bool,
}

pub struct PerkService;

impl PerkService {
    pub fn add(registry: &mut Registry, perk: NewPerk) -> ServiceResult<Perk> {
        validate_name("Perk", &perk.name)?;
        Self::validate_limit(perk.limit)?;
        Self::ensure_card_exists(registry, &perk.card_id)?;
        let id = unique_id(registry);
        let stored = registry.add_perk(Perk::from_new(id, perk));
        Ok(stored.clone())
    }

    /// Applies a patch. A perk that already points at a missing card may be
    /// edited freely, but the patch itself can only name an existing card.
    pub fn update(registry: &mut Registry, id: &str, patch: PerkPatch) -> ServiceResult<Perk> {
        if let Some(name) = patch.name.as_deref() {
            validate_name("Perk", name)?;
        }
        if let Some(limit) = patch.limit {
            Self::validate_limit(limit)?;
        }
        if let Some(card_id) = patch.card_id.as_deref() {
            Self::ensure_card_exists(registry, card_id)?;
        }
        let perk = registry
            .perk_mut(id)
            .ok_or_else(|| ServiceError::PerkNotFound(id.to_string()))?;
        patch.apply_to(perk);
        Ok(perk.clone())
    }

    pub fn remove(registry: &mut Registry, id: &str) -> ServiceResult<Perk> {
        registry
            .remove_perk(id)
            .ok_or_else(|| ServiceError::PerkNotFound(id.to_string()))
    }

    /// Every perk in insertion order with its card's name and color, falling
    /// back to [`UNKNOWN_CARD_LABEL`] for dangling references.
    pub fn listing(registry: &Registry) -> Vec<PerkListing<'_>> {
        registry
            .perks()
            .iter()
            .map(|perk| match registry.card(&perk.card_id) {
                Some(card) => PerkListing {
                    perk,
                    card_name: &card.name,
                    card_color: &card.color,
                    card_exists: true,
                },
                None => PerkListing {
                    perk,
                    card_name: UNKNOWN_CARD_LABEL,
                    card_color: DEFAULT_CARD_COLOR,
                    card_exists: false,
                },
            })
            .collect()
    }

    fn validate_limit(limit: u32) -> ServiceResult<()> {
        if limit >= 1 {
            Ok(())
        } else {
            Err(ServiceError::Invalid("Perk limit must be at least 1".into()))
        }
    }

    fn ensure_card_exists(registry: &Registry, card_id: &str) -> ServiceResult<()> {
        if registry.contains_card(card_id) {
            Ok(())
        } else {
            Err(ServiceError::Invalid(format!("Card `{card_id}` does not exist")))
        }
    }
}
