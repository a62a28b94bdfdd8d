use std::path::{Path, PathBuf};

use crate::core::clock::{Clock, SystemClock};
use crate::core::errors::Result;
use crate::core::services::{
    CardService, Checklist, ChecklistService, PerkListing, PerkService, ToggleOutcome,
    UsageService,
};
use crate::domain::{CalendarMonth, Card, CardPatch, NewCard, NewPerk, Perk, PerkPatch};
use crate::ledger::{Registry, UsageLedger};
use crate::storage::json_backend::{load_snapshot_from_path, save_snapshot_to_path};
use crate::storage::{load_or_default, save_record, Record, Snapshot, StorageBackend};
use crate::sync::{SyncError, SyncManager};

/// Record counts shown by `stats` and after imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataStats {
    pub cards: usize,
    pub perks: usize,
    pub usage_buckets: usize,
}

/// Facade owning the registry, the usage ledger and their persistence.
///
/// Every mutation writes the records it touched and, when auto-sync is on,
/// pushes a snapshot to the attached remote. Persistence and auto-sync
/// failures are logged and never undo the in-memory change.
pub struct PerkTracker {
    registry: Registry,
    usage: UsageLedger,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    default_color: String,
    sync: Option<SyncManager>,
}

impl PerkTracker {
    /// Loads all three records from `storage`. Missing or corrupt records start empty.
    pub fn open(storage: Box<dyn StorageBackend>) -> Self {
        let cards: Vec<Card> = load_or_default(storage.as_ref(), Record::Cards);
        let perks: Vec<Perk> = load_or_default(storage.as_ref(), Record::Perks);
        let usage: UsageLedger = load_or_default(storage.as_ref(), Record::Usage);
        tracing::info!(
            cards = cards.len(),
            perks = perks.len(),
            usage_buckets = usage.len(),
            "tracker state loaded"
        );
        Self {
            registry: Registry::from_parts(cards, perks),
            usage,
            storage,
            clock: Box::new(SystemClock),
            default_color: crate::domain::DEFAULT_CARD_COLOR.to_string(),
            sync: None,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    pub fn set_default_color(&mut self, color: impl Into<String>) {
        self.default_color = color.into();
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn usage(&self) -> &UsageLedger {
        &self.usage
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn current_month(&self) -> CalendarMonth {
        self.clock.current_month()
    }

    // Sync wiring

    pub fn attach_sync(&mut self, manager: SyncManager) {
        self.sync = Some(manager);
    }

    pub fn detach_sync(&mut self) -> Option<SyncManager> {
        self.sync.take()
    }

    pub fn sync(&self) -> Option<&SyncManager> {
        self.sync.as_ref()
    }

    // Cards

    pub fn add_card(&mut self, card: NewCard) -> Result<Card> {
        let card = CardService::add(&mut self.registry, card, &self.default_color)?;
        tracing::info!(card_id = %card.id, name = %card.name, "card added");
        self.persist(&[Record::Cards]);
        Ok(card)
    }

    pub fn update_card(&mut self, id: &str, patch: CardPatch) -> Result<Card> {
        let card = CardService::update(&mut self.registry, id, patch)?;
        tracing::info!(card_id = %card.id, "card updated");
        self.persist(&[Record::Cards]);
        Ok(card)
    }

    /// Removes a card and every perk attached to it. Usage history stays in the ledger.
    pub fn remove_card(&mut self, id: &str) -> Result<(Card, Vec<Perk>)> {
        let (card, perks) = CardService::remove(&mut self.registry, id)?;
        tracing::info!(card_id = %card.id, removed_perks = perks.len(), "card removed");
        self.persist(&[Record::Cards, Record::Perks]);
        Ok((card, perks))
    }

    pub fn cards(&self) -> &[Card] {
        self.registry.cards()
    }

    // Perks

    pub fn add_perk(&mut self, perk: NewPerk) -> Result<Perk> {
        let perk = PerkService::add(&mut self.registry, perk)?;
        tracing::info!(perk_id = %perk.id, card_id = %perk.card_id, "perk added");
        self.persist(&[Record::Perks]);
        Ok(perk)
    }

    pub fn update_perk(&mut self, id: &str, patch: PerkPatch) -> Result<Perk> {
        let perk = PerkService::update(&mut self.registry, id, patch)?;
        tracing::info!(perk_id = %perk.id, "perk updated");
        self.persist(&[Record::Perks]);
        Ok(perk)
    }

    pub fn remove_perk(&mut self, id: &str) -> Result<Perk> {
        let perk = PerkService::remove(&mut self.registry, id)?;
        tracing::info!(perk_id = %perk.id, "perk removed");
        self.persist(&[Record::Perks]);
        Ok(perk)
    }

    pub fn perks(&self) -> &[Perk] {
        self.registry.perks()
    }

    pub fn perk_listing(&self) -> Vec<PerkListing<'_>> {
        PerkService::listing(&self.registry)
    }

    // Usage

    pub fn usage_for(&self, perk_id: &str, month: CalendarMonth) -> u32 {
        UsageService::get(&self.registry, &self.usage, perk_id, month)
    }

    pub fn increment_usage(&mut self, perk_id: &str, month: CalendarMonth) -> u32 {
        let count = UsageService::increment(&self.registry, &mut self.usage, perk_id, month);
        self.persist(&[Record::Usage]);
        count
    }

    pub fn decrement_usage(&mut self, perk_id: &str, month: CalendarMonth) -> u32 {
        let count = UsageService::decrement(&self.registry, &mut self.usage, perk_id, month);
        self.persist(&[Record::Usage]);
        count
    }

    pub fn reset_usage(&mut self, perk_id: &str, month: CalendarMonth) -> bool {
        let removed = UsageService::reset(&self.registry, &mut self.usage, perk_id, month);
        if removed {
            tracing::info!(perk_id, month = %month, "usage reset");
            self.persist(&[Record::Usage]);
        }
        removed
    }

    // Checklist

    pub fn checklist(&self, month: CalendarMonth) -> Checklist<'_> {
        ChecklistService::build(&self.registry, &self.usage, month)
    }

    pub fn toggle(
        &mut self,
        perk_id: &str,
        month: CalendarMonth,
        checked: bool,
    ) -> Result<ToggleOutcome> {
        let outcome =
            ChecklistService::toggle(&self.registry, &mut self.usage, perk_id, month, checked)?;
        if outcome.changed {
            tracing::debug!(perk_id, month = %month, usage = outcome.usage, "usage toggled");
            self.persist(&[Record::Usage]);
        }
        Ok(outcome)
    }

    // Data management

    pub fn stats(&self) -> DataStats {
        DataStats {
            cards: self.registry.cards().len(),
            perks: self.registry.perks().len(),
            usage_buckets: self.usage.len(),
        }
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::new(&self.registry, &self.usage, self.clock.now())
    }

    /// Writes a snapshot to `target`. A directory target receives the dated default file name.
    pub fn export_to_path(&self, target: &Path) -> Result<PathBuf> {
        let path = if target.is_dir() {
            target.join(Snapshot::default_file_name(self.clock.today()))
        } else {
            target.to_path_buf()
        };
        save_snapshot_to_path(&self.export_snapshot(), &path)?;
        tracing::info!(path = %path.display(), "snapshot exported");
        Ok(path)
    }

    /// Replaces cards, perks and usage with the snapshot contents and persists them.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> DataStats {
        self.replace_state(snapshot);
        let dangling = self.registry.dangling_perks().len();
        if dangling > 0 {
            tracing::warn!(dangling, "imported perks reference missing cards");
        }
        self.persist(&Record::ALL);
        self.stats()
    }

    /// Reads, validates and imports a snapshot file. Nothing changes when validation fails.
    pub fn import_from_path(&mut self, path: &Path) -> Result<DataStats> {
        let snapshot = load_snapshot_from_path(path)?;
        let stats = self.import_snapshot(snapshot);
        tracing::info!(
            path = %path.display(),
            cards = stats.cards,
            perks = stats.perks,
            "snapshot imported"
        );
        Ok(stats)
    }

    /// Wipes all local records. The remote backup is left alone.
    ///
    /// Memory is only cleared once the stored records are gone.
    pub fn clear_all(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.registry.clear();
        self.usage.clear();
        tracing::warn!("all local data cleared");
        Ok(())
    }

    /// Drops usage buckets of perks that no longer exist. Returns how many were removed.
    pub fn prune_orphaned_usage(&mut self) -> usize {
        let live = self.registry.perk_ids();
        let removed = self.usage.prune_orphans(&live);
        if removed > 0 {
            tracing::info!(removed, "orphaned usage pruned");
            self.persist(&[Record::Usage]);
        }
        removed
    }

    // Remote

    pub fn push_to_remote(&mut self) -> Result<String> {
        let snapshot = self.export_snapshot();
        let now = self.clock.now();
        let manager = self.sync.as_mut().ok_or(SyncError::NotConnected)?;
        Ok(manager.push(&snapshot, now)?)
    }

    /// Replaces local state with the remote snapshot.
    pub fn pull_from_remote(&mut self) -> Result<DataStats> {
        let now = self.clock.now();
        let manager = self.sync.as_mut().ok_or(SyncError::NotConnected)?;
        let snapshot = manager.pull(now)?;
        self.replace_state(snapshot);
        self.write_records(&Record::ALL);
        Ok(self.stats())
    }

    pub fn set_auto_sync(&mut self, enabled: bool) -> Result<()> {
        let manager = self.sync.as_mut().ok_or(SyncError::NotConnected)?;
        manager.set_auto_sync(enabled)?;
        tracing::info!(enabled, "auto-sync updated");
        Ok(())
    }

    fn replace_state(&mut self, snapshot: Snapshot) {
        let (registry, usage) = snapshot.into_parts();
        self.registry = registry;
        self.usage = usage;
    }

    fn persist(&mut self, records: &[Record]) {
        if self.write_records(records) {
            self.auto_push();
        }
    }

    /// Returns whether every record was written.
    fn write_records(&self, records: &[Record]) -> bool {
        let mut ok = true;
        for record in records {
            let outcome = match record {
                Record::Cards => save_record(self.storage.as_ref(), *record, self.registry.cards()),
                Record::Perks => save_record(self.storage.as_ref(), *record, self.registry.perks()),
                Record::Usage => save_record(self.storage.as_ref(), *record, &self.usage),
            };
            if let Err(err) = outcome {
                tracing::error!(record = record.name(), error = %err, "failed to persist record");
                ok = false;
            }
        }
        ok
    }

    fn auto_push(&mut self) {
        let enabled = self.sync.as_ref().is_some_and(SyncManager::auto_sync);
        if !enabled {
            return;
        }
        if let Err(err) = self.push_to_remote() {
            tracing::warn!(error = %err, "auto-sync push failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::errors::PerkError;
    use crate::domain::Cadence;
    use crate::storage::MemoryStorage;
    use crate::sync::{MemoryRemote, DEFAULT_REMOTE_FILE_NAME};
    use chrono::{TimeZone, Utc};

    fn tracker() -> PerkTracker {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap());
        PerkTracker::open(Box::new(MemoryStorage::new())).with_clock(Box::new(clock))
    }

    fn seeded() -> (PerkTracker, String) {
        let mut tracker = tracker();
        let card = tracker.add_card(NewCard::new("Gold")).unwrap();
        let perk = tracker
            .add_perk(NewPerk::new(card.id, "Dining credit").with_cadence(Cadence::Monthly))
            .unwrap();
        (tracker, perk.id)
    }

    #[test]
    fn mutations_are_persisted() {
        let (mut tracker, perk_id) = seeded();
        let month = tracker.current_month();
        tracker.toggle(&perk_id, month, true).unwrap();

        let raw = tracker.storage().read(Record::Usage).unwrap().unwrap();
        assert_eq!(raw, format!(r#"{{"{perk_id}-2025-5":1}}"#));
        assert!(tracker.storage().read(Record::Cards).unwrap().is_some());
    }

    #[test]
    fn usage_counters_step_by_perk_id() {
        let (mut tracker, perk_id) = seeded();
        let month = tracker.current_month();
        assert_eq!(tracker.increment_usage(&perk_id, month), 1);
        assert_eq!(tracker.increment_usage(&perk_id, month), 2);
        assert_eq!(tracker.decrement_usage(&perk_id, month), 1);
        assert_eq!(tracker.usage_for(&perk_id, month), 1);
        assert!(tracker.reset_usage(&perk_id, month));
        assert_eq!(tracker.decrement_usage(&perk_id, month), 0);
    }

    #[test]
    fn import_replaces_everything() {
        let (mut tracker, _) = seeded();
        let raw = r#"{"cards":[],"perks":[],"usage":{"x-2025":3}}"#;
        let snapshot = Snapshot::from_json(raw).unwrap();
        let stats = tracker.import_snapshot(snapshot);
        assert_eq!(
            stats,
            DataStats {
                cards: 0,
                perks: 0,
                usage_buckets: 1
            }
        );
    }

    #[test]
    fn prune_removes_usage_of_deleted_perks() {
        let (mut tracker, perk_id) = seeded();
        let month = tracker.current_month();
        tracker.toggle(&perk_id, month, true).unwrap();
        tracker.remove_perk(&perk_id).unwrap();
        assert_eq!(tracker.stats().usage_buckets, 1);
        assert_eq!(tracker.prune_orphaned_usage(), 1);
        assert_eq!(tracker.stats().usage_buckets, 0);
    }

    #[test]
    fn auto_sync_pushes_after_mutation() {
        let (mut tracker, perk_id) = seeded();
        let remote = MemoryRemote::new();
        tracker.attach_sync(SyncManager::new(
            Box::new(remote.clone()),
            DEFAULT_REMOTE_FILE_NAME,
        ));
        tracker.set_auto_sync(true).unwrap();
        assert_eq!(remote.file_count(), 0);

        let month = tracker.current_month();
        tracker.toggle(&perk_id, month, true).unwrap();
        let pushed = remote.content_of(DEFAULT_REMOTE_FILE_NAME).unwrap();
        let snapshot = Snapshot::from_json(&pushed).unwrap();
        assert_eq!(snapshot.usage.len(), 1);
    }

    /// Accepts writes but refuses to clear.
    struct StickyStorage(MemoryStorage);

    impl StorageBackend for StickyStorage {
        fn read(&self, record: Record) -> Result<Option<String>> {
            self.0.read(record)
        }

        fn write(&self, record: Record, contents: &str) -> Result<()> {
            self.0.write(record, contents)
        }

        fn clear(&self) -> Result<()> {
            Err(PerkError::StorageError("read-only volume".into()))
        }
    }

    #[test]
    fn failed_clear_keeps_memory_in_step_with_disk() {
        let mut tracker = PerkTracker::open(Box::new(StickyStorage(MemoryStorage::new())));
        let card = tracker.add_card(NewCard::new("Gold")).unwrap();
        tracker.add_perk(NewPerk::new(card.id, "Lounge")).unwrap();
        let before = tracker.stats();

        assert!(tracker.clear_all().is_err());
        assert_eq!(tracker.stats(), before);
        assert!(tracker.storage().read(Record::Perks).unwrap().is_some());
    }

    #[test]
    fn remote_operations_require_connection() {
        let mut tracker = tracker();
        assert!(matches!(
            tracker.push_to_remote(),
            Err(PerkError::Sync(SyncError::NotConnected))
        ));
    }
}
