use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Card, Perk};

/// Cards and perks in insertion order.
///
/// The registry only stores entities; validation of new writes lives in the
/// card and perk services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub perks: Vec<Perk>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(cards: Vec<Card>, perks: Vec<Perk>) -> Self {
        Self { cards, perks }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn perks(&self) -> &[Perk] {
        &self.perks
    }

    pub fn add_card(&mut self, card: Card) -> &Card {
        self.cards.push(card);
        &self.cards[self.cards.len() - 1]
    }

    pub fn add_perk(&mut self, perk: Perk) -> &Perk {
        self.perks.push(perk);
        &self.perks[self.perks.len() - 1]
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    pub fn perk(&self, id: &str) -> Option<&Perk> {
        self.perks.iter().find(|perk| perk.id == id)
    }

    pub fn perk_mut(&mut self, id: &str) -> Option<&mut Perk> {
        self.perks.iter_mut().find(|perk| perk.id == id)
    }

    pub fn contains_card(&self, id: &str) -> bool {
        self.card(id).is_some()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.card(id).is_some() || self.perk(id).is_some()
    }

    pub fn perks_for_card<'a>(&'a self, card_id: &'a str) -> impl Iterator<Item = &'a Perk> + 'a {
        self.perks.iter().filter(move |perk| perk.card_id == card_id)
    }

    /// Removes a card together with every perk that references it.
    pub fn remove_card(&mut self, id: &str) -> Option<(Card, Vec<Perk>)> {
        let index = self.cards.iter().position(|card| card.id == id)?;
        let card = self.cards.remove(index);
        let (removed, kept): (Vec<Perk>, Vec<Perk>) = std::mem::take(&mut self.perks)
            .into_iter()
            .partition(|perk| perk.card_id == id);
        self.perks = kept;
        Some((card, removed))
    }

    pub fn remove_perk(&mut self, id: &str) -> Option<Perk> {
        let index = self.perks.iter().position(|perk| perk.id == id)?;
        Some(self.perks.remove(index))
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.perks.clear();
    }

    pub fn perk_ids(&self) -> Vec<&str> {
        self.perks.iter().map(|perk| perk.id.as_str()).collect()
    }

    /// Perks whose card no longer resolves. These can only arrive through imports.
    pub fn dangling_perks(&self) -> Vec<&Perk> {
        let card_ids: HashSet<&str> = self.cards.iter().map(|card| card.id.as_str()).collect();
        self.perks
            .iter()
            .filter(|perk| !card_ids.contains(perk.card_id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewCard, NewPerk, DEFAULT_CARD_COLOR};

    fn card(id: &str) -> Card {
        Card::from_new(id.into(), NewCard::new(format!("Card {id}")), DEFAULT_CARD_COLOR)
    }

    fn perk(id: &str, card_id: &str) -> Perk {
        Perk::from_new(id.into(), NewPerk::new(card_id, format!("Perk {id}")))
    }

    #[test]
    fn remove_card_cascades_only_to_its_perks() {
        let mut registry = Registry::new();
        registry.add_card(card("a"));
        registry.add_card(card("b"));
        registry.add_perk(perk("p1", "a"));
        registry.add_perk(perk("p2", "b"));
        registry.add_perk(perk("p3", "a"));

        let (removed_card, removed_perks) = registry.remove_card("a").unwrap();
        assert_eq!(removed_card.id, "a");
        assert_eq!(
            removed_perks.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["p1", "p3"]
        );
        assert_eq!(registry.perk_ids(), vec!["p2"]);
        assert!(registry.perk("p1").is_none());
    }

    #[test]
    fn missing_ids_resolve_to_none() {
        let mut registry = Registry::new();
        assert!(registry.card("nope").is_none());
        assert!(registry.perk("nope").is_none());
        assert!(registry.remove_card("nope").is_none());
        assert!(registry.remove_perk("nope").is_none());
    }

    #[test]
    fn dangling_perks_are_reported() {
        let registry = Registry::from_parts(
            vec![card("a")],
            vec![perk("p1", "a"), perk("p2", "gone")],
        );
        let dangling = registry.dangling_perks();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].id, "p2");
    }
}
