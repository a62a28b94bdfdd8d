mod common;

use std::fs;

use common::{month, open_tracker, temp_home};
use perk_core::core::errors::PerkError;
use perk_core::domain::{Cadence, NewCard, NewPerk};
use perk_core::storage::{Snapshot, SnapshotError};

#[test]
fn export_then_import_into_fresh_home_restores_everything() {
    let source_home = temp_home();
    let mut source = open_tracker(&source_home);
    let card = source
        .add_card(NewCard::new("Platinum").with_color("#111111"))
        .unwrap();
    let perk = source
        .add_perk(
            NewPerk::new(card.id, "Airline fee")
                .with_limit(2)
                .with_cadence(Cadence::Annually),
        )
        .unwrap();
    source.toggle(&perk.id, month(2025, 3), true).unwrap();

    let exports = source_home.join("exports");
    fs::create_dir_all(&exports).unwrap();
    let path = source.export_to_path(&exports).unwrap();
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("credit-card-perks-backup-2025-05-20.json")
    );

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"exportDate\": \"2025-05-20T12:00:00.000Z\""));
    assert!(raw.contains("\"version\": \"1.0\""));

    let target_home = temp_home();
    let mut target = open_tracker(&target_home);
    let stats = target.import_from_path(&path).unwrap();
    assert_eq!((stats.cards, stats.perks, stats.usage_buckets), (1, 1, 1));
    assert_eq!(target.usage_for(&perk.id, month(2025, 10)), 1);
    assert_eq!(target.cards()[0].color, "#111111");

    let reopened = open_tracker(&target_home);
    assert_eq!(reopened.stats(), stats);
}

#[test]
fn import_with_missing_section_leaves_state_untouched() {
    let home = temp_home();
    let mut tracker = open_tracker(&home);
    let card = tracker.add_card(NewCard::new("Gold")).unwrap();
    tracker.add_perk(NewPerk::new(card.id, "Dining")).unwrap();
    let before = tracker.stats();

    let bad = home.join("bad.json");
    fs::write(&bad, r#"{"cards": [], "perks": []}"#).unwrap();
    let err = tracker.import_from_path(&bad).unwrap_err();
    assert!(matches!(
        err,
        PerkError::Import(SnapshotError::MissingField("usage"))
    ));
    assert!(err.to_string().contains("Invalid backup file format"));
    assert_eq!(tracker.stats(), before);

    let reopened = open_tracker(&home);
    assert_eq!(reopened.stats(), before);
}

#[test]
fn import_of_missing_file_is_an_import_error() {
    let home = temp_home();
    let mut tracker = open_tracker(&home);
    tracker.add_card(NewCard::new("Gold")).unwrap();

    let err = tracker
        .import_from_path(&home.join("nowhere.json"))
        .unwrap_err();
    assert!(matches!(
        err,
        PerkError::Import(SnapshotError::Unreadable { .. })
    ));
    assert!(err.to_string().contains("nowhere.json"));
    assert_eq!(tracker.stats().cards, 1);
}

#[test]
fn import_accepts_backups_without_metadata() {
    let home = temp_home();
    let mut tracker = open_tracker(&home);
    let snapshot = Snapshot::from_json(
        r#"{
            "cards": [{"id": "c1", "name": "Imported", "issuer": ""}],
            "perks": [{"id": "p1", "cardId": "c1", "name": "Lounge", "limit": 3, "cadence": "semi-annually"}],
            "usage": {"p1-2025-H1": 2}
        }"#,
    )
    .unwrap();
    tracker.import_snapshot(snapshot);

    assert_eq!(tracker.cards()[0].issuer, None);
    assert_eq!(tracker.usage_for("p1", month(2025, 4)), 2);
    assert_eq!(tracker.usage_for("p1", month(2025, 7)), 0);
}
