//! Types for content generation requests.

use serde::{Deserialize, Serialize};

/// Everything the content service needs to find and use a finished transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub event_id: String,
    pub user_id: String,
    pub title: String,
    pub bot_id: Option<String>,
    pub transcript_url: String,
}
