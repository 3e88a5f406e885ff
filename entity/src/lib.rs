use uuid::Uuid;

// Meeting transcript lifecycle
pub mod trackable_events;
pub mod transcript_status;

// Stored OAuth credentials
pub mod oauth_connections;
pub mod platform;
pub mod platform_connections;
pub mod provider;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
