//! Google OAuth refresh adapter.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::{ReplyFormat, TokenEndpoint};
use crate::error::Error;
use crate::oauth::token::RefreshResult;
use crate::oauth::{ClientCredentials, ProviderKind};

/// Google OAuth provider.
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
                ProviderKind::Google,
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
        ProviderKind::Google
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
    use mockito::Matcher;
    use secrecy::ExposeSecret;

    fn provider(server: &mockito::Server) -> Provider {
        Provider::new(
            ClientCredentials::new("cid", "csecret"),
            format!("{}/token", server.url()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn refresh_posts_form_and_keeps_refresh_token_absent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "r1".into()),
                Matcher::UrlEncoded("client_id".into(), "cid".into()),
                Matcher::UrlEncoded("client_secret".into(), "csecret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"a2","expires_in":3600,"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let result = provider(&server).refresh_token("r1").await.unwrap();

        assert_eq!(result.access_token.expose_secret(), "a2");
        assert_eq!(result.expires_in, 3600);
        assert!(result.refresh_token.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_grant_reports_revocation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#)
            .create_async()
            .await;

        let err = provider(&server).refresh_token("r1").await.unwrap_err();
        assert!(err.is_revoked());
    }

    #[tokio::test]
    async fn other_rejection_is_a_plain_refresh_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let err = provider(&server).refresh_token("r1").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::ErrorKind::OAuth(crate::error::OAuthErrorKind::TokenRefreshFailed)
        );
    }
}
