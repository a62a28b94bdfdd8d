//! In-memory state: the card/perk registry and the usage ledger.

pub mod registry;
pub mod usage;

pub use registry::Registry;
pub use usage::UsageLedger;
