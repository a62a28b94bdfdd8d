use crate::core::services::{CardService, PerkService, ServiceError, UNKNOWN_CARD_LABEL};
use crate::domain::{Cadence, NewCard, NewPerk, Perk, PerkPatch, DEFAULT_CARD_COLOR};
use crate::ledger::Registry;

#[test]
fn add_perk_requires_existing_card() {
    let mut registry = Registry::new();
    let err = PerkService::add(&mut registry, NewPerk::new("ghost", "Lounge")).unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));
    assert!(registry.perks().is_empty());
}

#[test]
fn zero_limit_is_rejected() {
    let (mut registry, card_id, perk_id) = super::registry_with_perk(Cadence::Monthly, 1);
    let err =
        PerkService::add(&mut registry, NewPerk::new(card_id, "Bad").with_limit(0)).unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));

    let err = PerkService::update(
        &mut registry,
        &perk_id,
        PerkPatch {
            limit: Some(0),
            ..PerkPatch::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));
    assert_eq!(registry.perk(&perk_id).unwrap().limit, 1);
}

#[test]
fn update_cannot_point_at_missing_card() {
    let (mut registry, _, perk_id) = super::registry_with_perk(Cadence::Quarterly, 1);
    let err = PerkService::update(
        &mut registry,
        &perk_id,
        PerkPatch {
            card_id: Some("ghost".into()),
            ..PerkPatch::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));
}

#[test]
fn update_moves_perk_between_cards() {
    let (mut registry, _, perk_id) = super::registry_with_perk(Cadence::Annually, 1);
    let other = CardService::add(&mut registry, NewCard::new("Other"), DEFAULT_CARD_COLOR).unwrap();
    let moved = PerkService::update(
        &mut registry,
        &perk_id,
        PerkPatch {
            card_id: Some(other.id.clone()),
            cadence: Some(Cadence::SemiAnnually),
            ..PerkPatch::default()
        },
    )
    .unwrap();
    assert_eq!(moved.card_id, other.id);
    assert_eq!(moved.cadence, Cadence::SemiAnnually);
    assert_eq!(moved.name, "Airline credit");
}

#[test]
fn listing_labels_dangling_cards_as_unknown() {
    let (registry, card_id, _) = super::registry_with_perk(Cadence::Monthly, 1);
    let mut perks = registry.perks().to_vec();
    perks.push(Perk {
        id: "orphan".into(),
        card_id: "gone".into(),
        name: "Orphan".into(),
        description: None,
        limit: 1,
        cadence: Cadence::Monthly,
    });
    let registry = Registry::from_parts(registry.cards().to_vec(), perks);

    let listing = PerkService::listing(&registry);
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].card_name, "Platinum");
    assert_eq!(listing[0].perk.card_id, card_id);
    assert_eq!(listing[1].card_name, UNKNOWN_CARD_LABEL);
    assert!(!listing[1].card_exists);
}

#[test]
fn remove_missing_perk_reports_not_found() {
    let mut registry = Registry::new();
    let err = PerkService::remove(&mut registry, "nope").unwrap_err();
    assert_eq!(err, ServiceError::PerkNotFound("nope".into()));
}
