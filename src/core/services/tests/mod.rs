mod perk_service_tests;

use crate::core::services::{CardService, PerkService};
use crate::domain::{Cadence, CalendarMonth, NewCard, NewPerk, DEFAULT_CARD_COLOR};
use crate::ledger::Registry;

pub(super) fn month(year: i32, month: u32) -> CalendarMonth {
    CalendarMonth::new(year, month).unwrap()
}

/// Registry with one card and a single perk of the given cadence and limit.
pub(super) fn registry_with_perk(cadence: Cadence, limit: u32) -> (Registry, String, String) {
    let mut registry = Registry::new();
    let card =
        CardService::add(&mut registry, NewCard::new("Platinum"), DEFAULT_CARD_COLOR).unwrap();
    let perk = PerkService::add(
        &mut registry,
        NewPerk::new(card.id.clone(), "Airline credit")
            .with_limit(limit)
            .with_cadence(cadence),
    )
    .unwrap();
    (registry, card.id, perk.id)
}
