//! Recording bot provider trait.

use crate::types::recording::BotSnapshot;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for meeting bot services that join meetings to record.
///
/// Implementations translate the provider's bot representation into a
/// [`BotSnapshot`]. A response with no recognizable status is a snapshot with
/// `status_code: None`, not an error.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Retrieve current status and transcript location for a bot.
    async fn get_bot_status(&self, bot_id: &str) -> std::result::Result<BotSnapshot, Error>;

    /// Return unique identifier for this provider (e.g., "recall_ai").
    ///
    /// Used for logging. Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
