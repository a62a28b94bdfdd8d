use crate::domain::{bucket_key, BucketKey, Cadence, CalendarMonth};
use crate::ledger::{Registry, UsageLedger};

/// Perk-id based access to the usage ledger.
///
/// The bucket is resolved through the perk's cadence. An id that does not
/// resolve to a perk uses the per-month bucket.
pub struct UsageService;

impl UsageService {
    pub fn bucket_for(registry: &Registry, perk_id: &str, month: CalendarMonth) -> BucketKey {
        match registry.perk(perk_id) {
            Some(perk) => perk.bucket(month),
            None => bucket_key(perk_id, &Cadence::Monthly, month),
        }
    }

    pub fn get(
        registry: &Registry,
        ledger: &UsageLedger,
        perk_id: &str,
        month: CalendarMonth,
    ) -> u32 {
        ledger.get(&Self::bucket_for(registry, perk_id, month))
    }

    pub fn increment(
        registry: &Registry,
        ledger: &mut UsageLedger,
        perk_id: &str,
        month: CalendarMonth,
    ) -> u32 {
        ledger.increment(&Self::bucket_for(registry, perk_id, month))
    }

    pub fn decrement(
        registry: &Registry,
        ledger: &mut UsageLedger,
        perk_id: &str,
        month: CalendarMonth,
    ) -> u32 {
        ledger.decrement(&Self::bucket_for(registry, perk_id, month))
    }

    pub fn reset(
        registry: &Registry,
        ledger: &mut UsageLedger,
        perk_id: &str,
        month: CalendarMonth,
    ) -> bool {
        ledger.reset(&Self::bucket_for(registry, perk_id, month))
    }
}
