//! Content generation collaborator.

use crate::types::content::GenerationRequest;
use crate::Error;
use async_trait::async_trait;

/// Produces content (posts, summaries) from a completed transcript.
///
/// The poller only triggers generation; the result is used for logging.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> std::result::Result<(), Error>;
}
