//! HTTP client for the content service that turns finished transcripts into posts.

use async_trait::async_trait;
use log::*;
use meeting_ai::traits::content_generator::ContentGenerator;
use meeting_ai::{Error as MeetingAiError, GenerationRequest};
use meeting_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use reqwest::header::CONTENT_TYPE;
use secrecy::SecretString;
use std::time::Duration;

use crate::error::Error;

pub struct ContentServiceClient {
    client: AuthenticatedClient,
    generate_url: String,
}

impl ContentServiceClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self, Error> {
        // at most one generation request per completed event, so no transport retries
        let mut builder = AuthenticatedClientBuilder::new()
            .with_timeout(timeout)
            .with_max_retries(0);
        if let Some(key) = api_key {
            builder = builder.with_authorization(SecretString::new(format!("Bearer {key}")));
        }

        Ok(Self {
            client: builder.build()?,
            generate_url: format!("{}/generate", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ContentGenerator for ContentServiceClient {
    async fn generate(&self, request: GenerationRequest) -> Result<(), MeetingAiError> {
        debug!("Requesting content generation for event {}", request.event_id);

        let body = serde_json::to_vec(&request)
            .map_err(|e| MeetingAiError::Other(Box::new(e)))?;

        let response = self
            .client
            .post(&self.generate_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| MeetingAiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!("Content generation accepted for event {}", request.event_id);
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(MeetingAiError::Provider(format!(
                "content service returned {status}: {error_text}"
            )))
        }
    }
}
