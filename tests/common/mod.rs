#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use perk_core::core::clock::FixedClock;
use perk_core::domain::CalendarMonth;
use perk_core::storage::JsonStorage;
use perk_core::PerkTracker;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a fresh home directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a JSON-backed tracker in `home` with the clock pinned to 2025-05-20.
pub fn open_tracker(home: &Path) -> PerkTracker {
    let storage = JsonStorage::new(Some(home.to_path_buf())).expect("create json storage backend");
    let clock = FixedClock(Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap());
    PerkTracker::open(Box::new(storage)).with_clock(Box::new(clock))
}

pub fn month(year: i32, month: u32) -> CalendarMonth {
    CalendarMonth::new(year, month).expect("valid month")
}
