//! Storage access for the reconciliation workers.
//!
//! Each module wraps one table with the handful of queries and per-row updates the
//! workers need. Updates always re-read the row by id first, so a row deleted
//! between the candidate query and the write surfaces as `RecordNotFound`.

pub use entity::{
    oauth_connections, platform, platform_connections, provider, trackable_events,
    transcript_status, Id,
};

pub mod error;
pub mod oauth_connection;
pub mod platform_connection;
pub mod trackable_event;
