use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a meeting transcript as reconciled against the bot provider.
///
/// Statuses are ordered: `None < Scheduled < Recording < Processing < {Completed, Failed}`.
/// A status only ever moves forward along that order, and `Completed` and `Failed`
/// are terminal.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transcript_status")]
pub enum TranscriptStatus {
    /// No bot has been dispatched for the event
    #[sea_orm(string_value = "none")]
    #[default]
    None,
    /// A bot has been dispatched and is waiting to join
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// The bot is in the call and recording
    #[sea_orm(string_value = "recording")]
    Recording,
    /// The call ended; the provider is producing the transcript
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Transcript available at `transcript_url`
    #[sea_orm(string_value = "completed")]
    Completed,
    /// The provider reported an unrecoverable error
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl TranscriptStatus {
    /// Statuses the bot status poller keeps reconciling.
    pub const POLLABLE: [TranscriptStatus; 3] = [
        TranscriptStatus::Scheduled,
        TranscriptStatus::Recording,
        TranscriptStatus::Processing,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, TranscriptStatus::Completed | TranscriptStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            TranscriptStatus::None => 0,
            TranscriptStatus::Scheduled => 1,
            TranscriptStatus::Recording => 2,
            TranscriptStatus::Processing => 3,
            TranscriptStatus::Completed | TranscriptStatus::Failed => 4,
        }
    }

    /// Whether moving from `self` to `next` respects the forward-only lifecycle.
    pub fn can_advance_to(&self, next: TranscriptStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for TranscriptStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptStatus::None => write!(fmt, "none"),
            TranscriptStatus::Scheduled => write!(fmt, "scheduled"),
            TranscriptStatus::Recording => write!(fmt, "recording"),
            TranscriptStatus::Processing => write!(fmt, "processing"),
            TranscriptStatus::Completed => write!(fmt, "completed"),
            TranscriptStatus::Failed => write!(fmt, "failed"),
        }
    }
}
