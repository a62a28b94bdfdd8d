mod common;

use common::{month, open_tracker, temp_home};
use perk_core::core::errors::PerkError;
use perk_core::domain::{NewCard, NewPerk};
use perk_core::sync::{
    DirectoryRemote, MemoryRemote, RemoteFileStore, SyncError, SyncManager, SyncState,
    DEFAULT_REMOTE_FILE_NAME,
};

#[test]
fn push_from_one_home_and_pull_into_another() {
    let drive = temp_home();
    let first_home = temp_home();
    let mut first = open_tracker(&first_home);
    first.attach_sync(SyncManager::new(
        Box::new(DirectoryRemote::new(&drive).unwrap()),
        DEFAULT_REMOTE_FILE_NAME,
    ));
    let card = first.add_card(NewCard::new("Gold")).unwrap();
    let perk = first.add_perk(NewPerk::new(card.id, "Dining")).unwrap();
    first.toggle(&perk.id, month(2025, 5), true).unwrap();

    let file_id = first.push_to_remote().unwrap();
    assert_eq!(file_id, DEFAULT_REMOTE_FILE_NAME);
    assert!(drive.join(DEFAULT_REMOTE_FILE_NAME).is_file());

    let second_home = temp_home();
    let mut second = open_tracker(&second_home);
    second.attach_sync(SyncManager::new(
        Box::new(DirectoryRemote::new(&drive).unwrap()),
        DEFAULT_REMOTE_FILE_NAME,
    ));
    let stats = second.pull_from_remote().unwrap();
    assert_eq!((stats.cards, stats.perks, stats.usage_buckets), (1, 1, 1));
    assert_eq!(second.usage_for(&perk.id, month(2025, 5)), 1);
    assert_eq!(
        second.sync().and_then(|sync| sync.state().file_id.clone()),
        Some(DEFAULT_REMOTE_FILE_NAME.to_string())
    );

    let reopened = open_tracker(&second_home);
    assert_eq!(reopened.stats(), stats);
}

#[test]
fn pull_without_backup_reports_no_remote_backup() {
    let home = temp_home();
    let mut tracker = open_tracker(&home);
    tracker.add_card(NewCard::new("Local")).unwrap();
    tracker.attach_sync(SyncManager::new(
        Box::new(MemoryRemote::new()),
        DEFAULT_REMOTE_FILE_NAME,
    ));

    let err = tracker.pull_from_remote().unwrap_err();
    assert!(matches!(err, PerkError::Sync(SyncError::NoRemoteBackup)));
    assert_eq!(tracker.cards().len(), 1);
}

#[test]
fn auto_sync_state_persists_and_pushes_on_mutation() {
    let home = temp_home();
    let state_path = home.join("sync.json");
    let remote = MemoryRemote::new();

    let mut tracker = open_tracker(&home);
    tracker.attach_sync(
        SyncManager::new(Box::new(remote.clone()), DEFAULT_REMOTE_FILE_NAME)
            .with_state(SyncState::load(&state_path), state_path.clone()),
    );
    tracker.set_auto_sync(true).unwrap();
    tracker.add_card(NewCard::new("Auto")).unwrap();

    let id = remote.find_by_name(DEFAULT_REMOTE_FILE_NAME).unwrap().unwrap();
    assert!(remote.read(&id).unwrap().contains("\"Auto\""));

    let state = SyncState::load(&state_path);
    assert!(state.auto_sync);
    assert_eq!(state.file_id.as_deref(), Some(id.as_str()));
    assert!(state.last_sync.is_some());
}

#[test]
fn failed_auto_push_keeps_local_change() {
    let home = temp_home();
    let remote = MemoryRemote::new();
    let mut tracker = open_tracker(&home);
    tracker.attach_sync(SyncManager::new(
        Box::new(remote.clone()),
        DEFAULT_REMOTE_FILE_NAME,
    ));
    tracker.set_auto_sync(true).unwrap();
    tracker.add_card(NewCard::new("First")).unwrap();
    let id = remote.find_by_name(DEFAULT_REMOTE_FILE_NAME).unwrap().unwrap();
    remote.delete(&id);

    tracker.add_card(NewCard::new("Second")).unwrap();
    assert_eq!(tracker.cards().len(), 2);
    assert!(tracker.sync().unwrap().state().file_id.is_none());
}
