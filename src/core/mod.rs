pub mod clock;
pub mod errors;
pub mod services;
pub mod tracker;
pub mod utils;

pub use tracker::{DataStats, PerkTracker};
