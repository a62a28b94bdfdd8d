#![doc(test(attr(deny(warnings))))]

//! Perk Core tracks recurring credit-card benefits: the cards, the perks each
//! card grants, and how many times every perk was redeemed in its current
//! monthly, quarterly, semi-annual, or annual period.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ledger;
pub mod storage;
pub mod sync;
pub mod utils;

use std::sync::Once;

pub use crate::core::{DataStats, PerkTracker};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(
            build = %utils::build_info::current().summary(),
            "Perk Core tracing initialized."
        );
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
