//! Meeting AI abstraction layer for recording bots and content generation.
//!
//! This crate provides trait-based abstractions for the reconciliation workers:
//! - Recording bots that join meetings and produce transcripts
//! - Content generators invoked once a transcript is available
//!
//! The design is provider-agnostic, so the poller never sees a provider's
//! wire format; only a normalized [`types::recording::BotSnapshot`].

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::content::GenerationRequest;
pub use types::recording::{BotSnapshot, BotStatusCode};
