//! Facebook OAuth refresh adapter.
//!
//! The Graph API may answer with a URL-encoded body instead of JSON and may
//! name the lifetime `expires` rather than `expires_in`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::{ReplyFormat, TokenEndpoint};
use crate::error::Error;
use crate::oauth::token::RefreshResult;
use crate::oauth::{ClientCredentials, ProviderKind};

/// Facebook OAuth provider.
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
                ProviderKind::Facebook,
                token_url.into(),
                ReplyFormat::JsonOrUrlEncoded,
                timeout,
            )?,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Facebook
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret().as_str()),
        ];
        self.endpoint.refresh(&form, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Provider as _;
    use secrecy::ExposeSecret;

    async fn refresh_with_body(content_type: &str, body: &str) -> RefreshResult {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/access_token")
            .with_status(200)
            .with_header("content-type", content_type)
            .with_body(body)
            .create_async()
            .await;

        Provider::new(
            ClientCredentials::new("cid", "csecret"),
            format!("{}/oauth/access_token", server.url()),
            Duration::from_secs(5),
        )
        .unwrap()
        .refresh_token("r1")
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn url_encoded_reply_is_normalized() {
        let result =
            refresh_with_body("text/plain", "access_token=EAAGm0PX4ZCps&expires=5183944").await;

        assert_eq!(result.access_token.expose_secret(), "EAAGm0PX4ZCps");
        assert_eq!(result.expires_in, 5183944);
        assert!(result.refresh_token.is_none());
    }

    #[tokio::test]
    async fn json_reply_is_accepted() {
        let result = refresh_with_body(
            "application/json",
            r#"{"access_token":"EAAGm0PX4ZCps","token_type":"bearer","expires_in":5183944}"#,
        )
        .await;

        assert_eq!(result.access_token.expose_secret(), "EAAGm0PX4ZCps");
        assert_eq!(result.expires_in, 5183944);
    }
}
