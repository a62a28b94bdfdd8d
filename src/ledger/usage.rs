use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::BucketKey;

/// Redemption counts keyed by usage bucket. A missing bucket counts as zero.
///
/// The ledger never enforces a perk's limit; callers check it before
/// incrementing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLedger {
    counts: BTreeMap<String, u32>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_map(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    pub fn get(&self, key: &BucketKey) -> u32 {
        self.counts.get(key.as_str()).copied().unwrap_or(0)
    }

    /// Adds one redemption and returns the new count.
    pub fn increment(&mut self, key: &BucketKey) -> u32 {
        let count = self.counts.entry(key.as_str().to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Removes one redemption if any are recorded. Returns the resulting count.
    pub fn decrement(&mut self, key: &BucketKey) -> u32 {
        match self.counts.get_mut(key.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                *count
            }
            _ => 0,
        }
    }

    /// Drops the bucket entirely. Returns whether an entry existed.
    pub fn reset(&mut self, key: &BucketKey) -> bool {
        self.counts.remove(key.as_str()).is_some()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// Removes buckets that belong to none of `live_perk_ids`. Returns how many were dropped.
    pub fn prune_orphans(&mut self, live_perk_ids: &[&str]) -> usize {
        let before = self.counts.len();
        self.counts
            .retain(|key, _| live_perk_ids.iter().any(|id| bucket_belongs_to(key, id)));
        before - self.counts.len()
    }
}

/// Checks that `key` is `{perk_id}-{year}` optionally followed by `-{month}`,
/// `-Q{n}` or `-H{n}`. Prefix matching alone would confuse ids such as `1` and `1-2`.
fn bucket_belongs_to(key: &str, perk_id: &str) -> bool {
    let Some(rest) = key
        .strip_prefix(perk_id)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    let (year, period) = match rest.split_once('-') {
        Some((year, period)) => (year, Some(period)),
        None => (rest, None),
    };
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match period {
        None => true,
        Some(period) => {
            let digits = period
                .strip_prefix('Q')
                .or_else(|| period.strip_prefix('H'))
                .unwrap_or(period);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
    }
}
