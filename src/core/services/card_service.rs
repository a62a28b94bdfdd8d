use crate::domain::{Card, CardPatch, NewCard, Perk};
use crate::ledger::Registry;

use super::{unique_id, validate_color, validate_name, ServiceError, ServiceResult};

pub struct CardService;

impl CardService {
    /// Validates and stores a new card, assigning its identifier.
    pub fn add(registry: &mut Registry, card: NewCard, default_color: &str) -> ServiceResult<Card> {
        validate_name("Card", &card.name)?;
        if let Some(color) = card.color.as_deref().filter(|color| !color.trim().is_empty()) {
            validate_color(color)?;
        }
        let id = unique_id(registry);
        let stored = registry.add_card(Card::from_new(id, card, default_color));
        Ok(stored.clone())
    }

    pub fn update(registry: &mut Registry, id: &str, patch: CardPatch) -> ServiceResult<Card> {
        if let Some(name) = patch.name.as_deref() {
            validate_name("Card", name)?;
        }
        if let Some(color) = patch.color.as_deref() {
            validate_color(color)?;
        }
        let card = registry
            .card_mut(id)
            .ok_or_else(|| ServiceError::CardNotFound(id.to_string()))?;
        patch.apply_to(card);
        Ok(card.clone())
    }

    /// Deletes a card and its perks. Usage buckets of those perks are left in place.
    pub fn remove(registry: &mut Registry, id: &str) -> ServiceResult<(Card, Vec<Perk>)> {
        registry
            .remove_card(id)
            .ok_or_else(|| ServiceError::CardNotFound(id.to_string()))
    }

    pub fn list(registry: &Registry) -> Vec<&Card> {
        registry.cards().iter().collect()
    }
}
