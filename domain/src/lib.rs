//! Reconciliation logic for the background workers.
//!
//! Consumers (the `workers` crate and the binaries) reach storage and provider
//! types only through this crate.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    oauth_connections, platform, platform_connections, provider, trackable_events,
    transcript_status, Id,
};

pub use cycle_report::CycleReport;

pub mod cycle_report;
pub mod error;
pub mod token_health;
pub mod token_refresh;
pub mod transcript_sync;

pub mod gateway;
