//! Types for recording bot status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code reported by a recording bot.
///
/// Only the codes the poller acts on have their own variant; everything else
/// is preserved in `Other` so it can be logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BotStatusCode {
    InCallRecording,
    CallEnded,
    RecordingDone,
    TranscriptionCompleted,
    Done,
    /// Covers both `error` and `fatal`.
    Error,
    Other(String),
}

impl BotStatusCode {
    pub fn as_str(&self) -> &str {
        match self {
            BotStatusCode::InCallRecording => "in_call_recording",
            BotStatusCode::CallEnded => "call_ended",
            BotStatusCode::RecordingDone => "recording_done",
            BotStatusCode::TranscriptionCompleted => "transcription_completed",
            BotStatusCode::Done => "done",
            BotStatusCode::Error => "error",
            BotStatusCode::Other(code) => code,
        }
    }
}

impl From<&str> for BotStatusCode {
    fn from(code: &str) -> Self {
        match code {
            "in_call_recording" => BotStatusCode::InCallRecording,
            "call_ended" => BotStatusCode::CallEnded,
            "recording_done" => BotStatusCode::RecordingDone,
            "transcription_completed" => BotStatusCode::TranscriptionCompleted,
            "done" => BotStatusCode::Done,
            "error" | "fatal" => BotStatusCode::Error,
            other => BotStatusCode::Other(other.to_string()),
        }
    }
}

impl From<String> for BotStatusCode {
    fn from(code: String) -> Self {
        BotStatusCode::from(code.as_str())
    }
}

impl From<BotStatusCode> for String {
    fn from(code: BotStatusCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for BotStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized view of a bot at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotSnapshot {
    /// Most recent status code, if the provider reported one.
    pub status_code: Option<BotStatusCode>,
    /// Transcript download location, if one could be found.
    pub transcript_url: Option<String>,
}
