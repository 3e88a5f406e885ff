//! Bot status poller: moves trackable events through the transcript lifecycle
//! by reading each dispatched bot's status from the recording provider.

use crate::cycle_report::CycleReport;
use crate::error::Error;
use crate::gateway::content_service::ContentServiceClient;
use crate::gateway::recall_ai::{RecallAiClient, RecallRegion};
use entity::trackable_events::Model;
use entity::transcript_status::TranscriptStatus;
use entity_api::trackable_event;
use log::*;
use meeting_ai::traits::content_generator::ContentGenerator;
use meeting_ai::traits::recording_bot;
use meeting_ai::{BotSnapshot, BotStatusCode, GenerationRequest};
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;

/// A status change the poller wants to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub status: TranscriptStatus,
    pub transcript_url: Option<String>,
}

/// Decide what a bot snapshot means for an event currently at `current`.
///
/// Returns `None` when the snapshot carries no actionable code or when the
/// mapped status is not reachable from `current`.
pub fn plan_transition(current: TranscriptStatus, snapshot: &BotSnapshot) -> Option<Transition> {
    let (status, transcript_url) = match snapshot.status_code.as_ref()? {
        BotStatusCode::InCallRecording => (TranscriptStatus::Recording, None),
        BotStatusCode::CallEnded => (TranscriptStatus::Processing, None),
        BotStatusCode::RecordingDone => match &snapshot.transcript_url {
            Some(url) => (TranscriptStatus::Completed, Some(url.clone())),
            None => (TranscriptStatus::Processing, None),
        },
        BotStatusCode::TranscriptionCompleted | BotStatusCode::Done => (
            TranscriptStatus::Completed,
            snapshot.transcript_url.clone(),
        ),
        BotStatusCode::Error => (TranscriptStatus::Failed, None),
        BotStatusCode::Other(_) => return None,
    };

    current.can_advance_to(status).then_some(Transition {
        status,
        transcript_url,
    })
}

pub struct TranscriptSync {
    db: Arc<DatabaseConnection>,
    bot_provider: Arc<dyn recording_bot::Provider>,
    content_generator: Option<Arc<dyn ContentGenerator>>,
    request_timeout: Duration,
}

impl TranscriptSync {
    pub fn new(
        db: Arc<DatabaseConnection>,
        bot_provider: Arc<dyn recording_bot::Provider>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            db,
            bot_provider,
            content_generator: None,
            request_timeout,
        }
    }

    pub fn with_content_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.content_generator = Some(generator);
        self
    }

    /// Wire the Recall.ai client and, when configured, the content service.
    pub fn from_config(db: Arc<DatabaseConnection>, config: &Config) -> Result<Self, Error> {
        let api_key = config
            .recall_ai_api_key()
            .ok_or_else(|| Error::config("RECALL_AI_API_KEY is not set"))?;
        let region: RecallRegion = config.recall_ai_region().parse().unwrap_or_default();
        let timeout = config.provider_request_timeout();

        let bot_provider = RecallAiClient::new(
            &api_key,
            region,
            config.recall_ai_base_domain(),
            timeout,
        )?;
        let mut sync = Self::new(db, Arc::new(bot_provider), timeout);

        match config.content_service_url() {
            Some(url) => {
                let api_key = config.content_service_api_key();
                let generator = ContentServiceClient::new(&url, api_key.as_deref(), timeout)?;
                sync = sync.with_content_generator(Arc::new(generator));
            }
            None => warn!("CONTENT_SERVICE_URL is not set; completed transcripts will not trigger content generation"),
        }

        Ok(sync)
    }

    /// Poll every in-flight event once.
    ///
    /// Only the candidate query can fail the cycle; a failure for one event is
    /// logged and counted.
    pub async fn run_cycle(&self) -> Result<CycleReport, Error> {
        let events = trackable_event::find_pollable(&self.db).await?;
        let mut report = CycleReport::new(events.len());

        for event in &events {
            let outcome = self.sync_event(event).await;
            if let Err(e) = &outcome {
                warn!("Transcript sync failed for event {}: {e}", event.id);
            }
            report.record(&outcome);
        }

        info!(
            "Transcript sync cycle via {}: {report}",
            self.bot_provider.provider_id()
        );
        Ok(report)
    }

    async fn sync_event(&self, event: &Model) -> Result<(), Error> {
        let Some(bot_id) = event.bot_id.as_deref() else {
            return Ok(());
        };

        let polled = tokio::time::timeout(
            self.request_timeout,
            self.bot_provider.get_bot_status(bot_id),
        )
        .await
        .map_err(|_| {
            Error::timeout(format!(
                "bot {bot_id} status request exceeded {:?}",
                self.request_timeout
            ))
        })?;

        let snapshot = match polled {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if !e.is_transient() {
                    error!(
                        "Bot {bot_id} for event {} will keep failing until fixed: {e}",
                        event.id
                    );
                }
                return Err(e.into());
            }
        };

        let Some(transition) = plan_transition(event.transcript_status, &snapshot) else {
            match &snapshot.status_code {
                Some(code) => debug!(
                    "No transition for event {} at {} from bot status {code}",
                    event.id, event.transcript_status
                ),
                None => debug!("No actionable status for bot {bot_id} (event {})", event.id),
            }
            return Ok(());
        };

        let updated = trackable_event::update_transcript_status(
            &self.db,
            event.id,
            transition.status,
            transition.transcript_url,
        )
        .await?;

        info!(
            "Event {} transcript {} -> {}",
            updated.id, event.transcript_status, updated.transcript_status
        );

        if updated.transcript_status == TranscriptStatus::Completed {
            self.trigger_generation(&updated);
        }
        Ok(())
    }

    /// Fire and forget; the completed status is already persisted.
    fn trigger_generation(&self, event: &Model) {
        let Some(generator) = self.content_generator.clone() else {
            info!("Event {} completed; no content service configured", event.id);
            return;
        };
        let Some(transcript_url) = event.transcript_url.clone() else {
            warn!(
                "Event {} completed without a transcript URL; skipping content generation",
                event.id
            );
            return;
        };

        let request = GenerationRequest {
            event_id: event.id.to_string(),
            user_id: event.user_id.to_string(),
            title: event.title.clone(),
            bot_id: event.bot_id.clone(),
            transcript_url,
        };

        tokio::spawn(async move {
            let event_id = request.event_id.clone();
            if let Err(e) = generator.generate(request).await {
                error!("Content generation for event {event_id} failed: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(code: &str, url: Option<&str>) -> BotSnapshot {
        BotSnapshot {
            status_code: Some(BotStatusCode::from(code)),
            transcript_url: url.map(str::to_string),
        }
    }

    #[test]
    fn call_ended_moves_scheduled_to_processing() {
        assert_eq!(
            plan_transition(TranscriptStatus::Scheduled, &snapshot("call_ended", None)),
            Some(Transition {
                status: TranscriptStatus::Processing,
                transcript_url: None
            })
        );
    }

    #[test]
    fn call_ended_is_a_no_op_once_processing() {
        assert_eq!(
            plan_transition(TranscriptStatus::Processing, &snapshot("call_ended", None)),
            None
        );
    }

    #[test]
    fn in_call_recording_moves_scheduled_to_recording() {
        assert_eq!(
            plan_transition(
                TranscriptStatus::Scheduled,
                &snapshot("in_call_recording", None)
            )
            .map(|t| t.status),
            Some(TranscriptStatus::Recording)
        );
    }

    #[test]
    fn recording_done_depends_on_transcript_url() {
        assert_eq!(
            plan_transition(TranscriptStatus::Recording, &snapshot("recording_done", None))
                .map(|t| t.status),
            Some(TranscriptStatus::Processing)
        );
        assert_eq!(
            plan_transition(
                TranscriptStatus::Recording,
                &snapshot("recording_done", Some("https://x/t.vtt"))
            ),
            Some(Transition {
                status: TranscriptStatus::Completed,
                transcript_url: Some("https://x/t.vtt".to_string())
            })
        );
    }

    #[test]
    fn done_completes_with_url() {
        assert_eq!(
            plan_transition(
                TranscriptStatus::Processing,
                &snapshot("done", Some("https://x/t.vtt"))
            ),
            Some(Transition {
                status: TranscriptStatus::Completed,
                transcript_url: Some("https://x/t.vtt".to_string())
            })
        );
        assert_eq!(
            plan_transition(
                TranscriptStatus::Scheduled,
                &snapshot("transcription_completed", None)
            )
            .map(|t| t.status),
            Some(TranscriptStatus::Completed)
        );
    }

    #[test]
    fn error_and_fatal_fail_the_event() {
        for code in ["error", "fatal"] {
            assert_eq!(
                plan_transition(TranscriptStatus::Recording, &snapshot(code, None))
                    .map(|t| t.status),
                Some(TranscriptStatus::Failed)
            );
        }
    }

    #[test]
    fn terminal_events_never_move() {
        for current in [TranscriptStatus::Completed, TranscriptStatus::Failed] {
            for code in ["call_ended", "done", "error", "in_call_recording"] {
                assert_eq!(
                    plan_transition(current, &snapshot(code, Some("https://x/other.vtt"))),
                    None
                );
            }
        }
    }

    #[test]
    fn unknown_or_missing_codes_are_no_ops() {
        assert_eq!(
            plan_transition(TranscriptStatus::Scheduled, &snapshot("in_waiting_room", None)),
            None
        );
        assert_eq!(
            plan_transition(TranscriptStatus::Scheduled, &BotSnapshot::default()),
            None
        );
    }
}
