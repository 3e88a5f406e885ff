//! Twitter/X OAuth refresh adapter.
//!
//! Twitter authenticates the client with HTTP Basic credentials and rotates
//! the refresh token on every use.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::{ReplyFormat, TokenEndpoint};
use crate::error::Error;
use crate::oauth::token::RefreshResult;
use crate::oauth::{ClientCredentials, ProviderKind};

/// Twitter/X OAuth provider.
pub struct Provider {
    credentials: ClientCredentials,
    endpoint: TokenEndpoint,
}

impl Provider {
    pub fn new(
        credentials: ClientCredentials,
        token_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        Ok(Self {
            credentials,
            endpoint: TokenEndpoint::new(
                ProviderKind::Twitter,
                token_url.into(),
                ReplyFormat::Json,
                timeout,
            )?,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Twitter
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.credentials.client_id.as_str()),
        ];
        let basic_auth = (
            self.credentials.client_id.as_str(),
            self.credentials.client_secret.expose_secret().as_str(),
        );
        self.endpoint.refresh(&form, Some(basic_auth)).await
    }
}
