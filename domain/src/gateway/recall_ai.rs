//! Recall.ai API client for polling meeting recording bots.
//!
//! The bot payload changes shape across API versions, so status and transcript
//! location are pulled out of a raw `serde_json::Value` rather than a fixed struct.

use async_trait::async_trait;
use log::*;
use meeting_ai::traits::recording_bot;
use meeting_ai::{BotSnapshot, BotStatusCode, Error as MeetingAiError};
use meeting_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// Recall.ai API regions
#[derive(Debug, Clone, Default)]
pub enum RecallRegion {
    #[default]
    UsWest2,
    UsEast1,
    EuWest1,
}

impl RecallRegion {
    /// Returns the region code (e.g., "us-west-2")
    pub fn as_str(&self) -> &'static str {
        match self {
            RecallRegion::UsWest2 => "us-west-2",
            RecallRegion::UsEast1 => "us-east-1",
            RecallRegion::EuWest1 => "eu-west-1",
        }
    }

    /// Constructs the full base URL using the given base domain
    pub fn base_url(&self, base_domain: &str) -> String {
        format!("https://{}.{}", self.as_str(), base_domain)
    }
}

impl FromStr for RecallRegion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "us-east-1" => RecallRegion::UsEast1,
            "eu-west-1" => RecallRegion::EuWest1,
            _ => RecallRegion::UsWest2,
        })
    }
}

/// Recall.ai API client
pub struct RecallAiClient {
    client: AuthenticatedClient,
    base_url: String,
}

impl RecallAiClient {
    /// Create a new Recall.ai client with the given API key, region, and base domain
    pub fn new(
        api_key: &str,
        region: RecallRegion,
        base_domain: &str,
        timeout: Duration,
    ) -> Result<Self, Error> {
        Self::with_base_url(api_key, region.base_url(base_domain), timeout)
    }

    /// Create a client against an explicit base URL such as `https://us-west-2.recall.ai`.
    ///
    /// No transport retries: the next polling cycle asks again.
    pub fn with_base_url(api_key: &str, base_url: String, timeout: Duration) -> Result<Self, Error> {
        let client = AuthenticatedClientBuilder::new()
            .with_authorization(SecretString::new(format!("Token {api_key}")))
            .with_timeout(timeout)
            .with_max_retries(0)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the raw bot payload.
    pub async fn fetch_bot(&self, bot_id: &str) -> Result<Value, MeetingAiError> {
        let url = format!("{}/api/v1/bot/{}/", self.base_url, bot_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to get Recall.ai bot status: {:?}", e);
            match e {
                reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
                    MeetingAiError::Timeout(format!("bot {bot_id}: {e}"))
                }
                e => MeetingAiError::Network(e.to_string()),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Value>().await.map_err(|e| {
                warn!("Failed to parse Recall.ai status response: {:?}", e);
                MeetingAiError::Deserialization(e.to_string())
            });
        }

        let error_text = response.text().await.unwrap_or_default();
        warn!("Recall.ai API error for bot {bot_id} ({status}): {error_text}");
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                MeetingAiError::Authentication(error_text)
            }
            StatusCode::NOT_FOUND => MeetingAiError::NotFound(format!("bot {bot_id}")),
            StatusCode::TOO_MANY_REQUESTS => MeetingAiError::RateLimited {
                retry_after_seconds: 60,
            },
            _ => MeetingAiError::Provider(format!("status {status}: {error_text}")),
        })
    }
}

#[async_trait]
impl recording_bot::Provider for RecallAiClient {
    async fn get_bot_status(&self, bot_id: &str) -> Result<BotSnapshot, MeetingAiError> {
        let payload = self.fetch_bot(bot_id).await?;
        Ok(parse_bot_status(&payload))
    }

    fn provider_id(&self) -> &str {
        "recall_ai"
    }
}

/// Reduce a bot payload to its latest status code and transcript location.
///
/// Never fails: an unrecognizable payload yields an empty snapshot.
pub fn parse_bot_status(bot: &Value) -> BotSnapshot {
    BotSnapshot {
        status_code: latest_status_code(bot).map(BotStatusCode::from),
        transcript_url: extract_transcript_url(bot),
    }
}

/// Last entry of `status_changes`, else a flat `status` string or `status.code`.
fn latest_status_code(bot: &Value) -> Option<&str> {
    let from_changes = bot
        .get("status_changes")
        .and_then(Value::as_array)
        .and_then(|changes| changes.last())
        .and_then(|change| change.get("code"))
        .and_then(Value::as_str);

    let code = match from_changes {
        Some(code) => Some(code),
        None => match bot.get("status")? {
            Value::String(code) => Some(code.as_str()),
            Value::Object(status) => status.get("code").and_then(Value::as_str),
            _ => None,
        },
    };
    code.filter(|code| !code.is_empty())
}

type UrlMatcher = fn(&Value) -> Option<String>;

/// Known transcript locations, newest API shape first.
const TRANSCRIPT_URL_MATCHERS: [UrlMatcher; 4] = [
    media_shortcut_download_url,
    legacy_recording_transcript_url,
    flat_transcript_url,
    transcript_media_entry_url,
];

/// First transcript URL any matcher finds.
pub fn extract_transcript_url(bot: &Value) -> Option<String> {
    TRANSCRIPT_URL_MATCHERS
        .iter()
        .find_map(|matcher| matcher(bot))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn media_shortcut_download_url(bot: &Value) -> Option<String> {
    non_empty_str(bot.pointer("/recordings/0/media_shortcuts/transcript/data/download_url"))
}

fn legacy_recording_transcript_url(bot: &Value) -> Option<String> {
    non_empty_str(bot.pointer("/recording/transcript_url"))
}

fn flat_transcript_url(bot: &Value) -> Option<String> {
    non_empty_str(bot.get("transcript_url"))
}

fn transcript_media_entry_url(bot: &Value) -> Option<String> {
    bot.get("media")?
        .as_array()?
        .iter()
        .filter(|media| media.get("type").and_then(Value::as_str) == Some("transcript"))
        .find_map(|media| non_empty_str(media.get("url")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meeting_ai::traits::recording_bot::Provider as _;
    use serde_json::json;

    #[test]
    fn last_status_change_wins() {
        let bot = json!({"status_changes": [
            {"code": "joining_call"},
            {"code": "in_call_recording"},
            {"code": "call_ended"}
        ]});
        assert_eq!(
            parse_bot_status(&bot).status_code,
            Some(BotStatusCode::CallEnded)
        );
    }

    #[test]
    fn flat_status_string_or_object() {
        assert_eq!(
            parse_bot_status(&json!({"status": "done"})).status_code,
            Some(BotStatusCode::Done)
        );
        assert_eq!(
            parse_bot_status(&json!({"status": {"code": "fatal", "sub_code": "bot_errored"}}))
                .status_code,
            Some(BotStatusCode::Error)
        );
    }

    #[test]
    fn missing_status_is_empty_snapshot() {
        let snapshot = parse_bot_status(&json!({"id": "b1", "status_changes": []}));
        assert_eq!(snapshot, BotSnapshot::default());

        let snapshot = parse_bot_status(&json!("not an object"));
        assert_eq!(snapshot, BotSnapshot::default());
    }

    #[test]
    fn media_shortcut_url_is_preferred() {
        let bot = json!({
            "status": "done",
            "transcript_url": "https://x/flat.vtt",
            "recordings": [{"media_shortcuts": {"transcript": {"data": {"download_url": "https://x/t.vtt"}}}}]
        });
        assert_eq!(extract_transcript_url(&bot).as_deref(), Some("https://x/t.vtt"));
    }

    #[test]
    fn legacy_and_flat_urls_are_found() {
        let legacy = json!({"recording": {"transcript_url": "https://x/legacy.vtt"}});
        assert_eq!(
            extract_transcript_url(&legacy).as_deref(),
            Some("https://x/legacy.vtt")
        );

        let flat = json!({"transcript_url": "https://x/flat.vtt"});
        assert_eq!(extract_transcript_url(&flat).as_deref(), Some("https://x/flat.vtt"));
    }

    #[test]
    fn transcript_media_entry_is_found() {
        let bot = json!({"media": [
            {"type": "video", "url": "https://x/v.mp4"},
            {"type": "transcript", "url": "https://x/m.json"}
        ]});
        assert_eq!(extract_transcript_url(&bot).as_deref(), Some("https://x/m.json"));
    }

    #[test]
    fn empty_or_malformed_urls_never_match() {
        let bot = json!({
            "recordings": [{"media_shortcuts": {"transcript": null}}],
            "recording": "gone",
            "transcript_url": "",
            "media": {"type": "transcript"}
        });
        assert_eq!(extract_transcript_url(&bot), None);
    }

    #[test]
    fn region_base_url() {
        let region: RecallRegion = "eu-west-1".parse().unwrap();
        assert_eq!(region.base_url("recall.ai"), "https://eu-west-1.recall.ai");
        let fallback: RecallRegion = "mars-1".parse().unwrap();
        assert_eq!(fallback.as_str(), "us-west-2");
    }

    #[tokio::test]
    async fn get_bot_status_sends_token_and_parses_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/bot/b1/")
            .match_header("authorization", "Token key123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"b1","status_changes":[{"code":"done"}],"transcript_url":"https://x/t.vtt"}"#)
            .create_async()
            .await;

        let client =
            RecallAiClient::with_base_url("key123", server.url(), Duration::from_secs(5)).unwrap();
        let snapshot = client.get_bot_status("b1").await.unwrap();

        assert_eq!(snapshot.status_code, Some(BotStatusCode::Done));
        assert_eq!(snapshot.transcript_url.as_deref(), Some("https://x/t.vtt"));
        mock.assert_async().await;
    }

    #[test]
    fn unusable_api_key_is_a_configuration_error() {
        let err = RecallAiClient::with_base_url(
            "key\nwith newline",
            "https://us-west-2.recall.ai".to_string(),
            Duration::from_secs(5),
        )
        .err()
        .unwrap();

        assert_eq!(
            err.error_kind,
            crate::error::DomainErrorKind::Internal(crate::error::InternalErrorKind::Config)
        );
    }

    #[tokio::test]
    async fn server_error_is_not_retried_within_a_poll() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/bot/b1/")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client =
            RecallAiClient::with_base_url("key123", server.url(), Duration::from_secs(5)).unwrap();
        let err = client.get_bot_status("b1").await.unwrap_err();

        assert!(matches!(err, MeetingAiError::Provider(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_bot_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/bot/missing/")
            .with_status(404)
            .with_body(r#"{"detail":"Not found."}"#)
            .create_async()
            .await;

        let client =
            RecallAiClient::with_base_url("key123", server.url(), Duration::from_secs(5)).unwrap();
        let result = client.get_bot_status("missing").await;

        assert!(matches!(result, Err(MeetingAiError::NotFound(_))));
    }
}
