//! The periodic poll → translate → inject loop

pub mod engine;
pub mod stats;

pub use engine::{Bridge, BridgeSettings, TickOutcome};
pub use stats::TickStats;
