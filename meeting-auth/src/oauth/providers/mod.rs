//! OAuth refresh adapters, one per platform.
//!
//! All four speak `grant_type=refresh_token` against a form-encoded token
//! endpoint; they differ in how the client authenticates and in the shape of
//! the reply. The shared [`TokenEndpoint`] posts the form and normalizes the
//! reply; each adapter only chooses the form fields and reply format.

pub mod facebook;
pub mod google;
pub mod linkedin;
pub mod twitter;

use std::time::Duration;

use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, warn};

use super::token::{RefreshResult, DEFAULT_EXPIRES_IN_SECS};
use super::ProviderKind;
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::http::{AuthenticatedClient, AuthenticatedClientBuilder};

/// How the token endpoint encodes a successful reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplyFormat {
    Json,
    /// JSON, or `access_token=...&expires=...` for older Graph API versions.
    JsonOrUrlEncoded,
}

/// A provider's token endpoint plus the client used to reach it.
pub(crate) struct TokenEndpoint {
    kind: ProviderKind,
    token_url: String,
    reply_format: ReplyFormat,
    client: AuthenticatedClient,
}

impl TokenEndpoint {
    pub(crate) fn new(
        kind: ProviderKind,
        token_url: String,
        reply_format: ReplyFormat,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = AuthenticatedClientBuilder::new()
            .with_timeout(timeout)
            .build()?;
        Ok(Self {
            kind,
            token_url,
            reply_format,
            client,
        })
    }

    /// POST the refresh form, optionally with HTTP Basic client authentication.
    pub(crate) async fn refresh(
        &self,
        form: &[(&str, &str)],
        basic_auth: Option<(&str, &str)>,
    ) -> Result<RefreshResult, Error> {
        debug!("Refreshing {} access token", self.kind);

        let mut request = self.client.post(&self.token_url).form(form);
        if let Some((user, password)) = basic_auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send().await.map_err(|e| {
            warn!("Failed to reach {} token endpoint: {:?}", self.kind, e);
            Error::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_rejection(self.kind, status, &body));
        }

        let result = match self.reply_format {
            ReplyFormat::Json => parse_json_reply(&body),
            ReplyFormat::JsonOrUrlEncoded => {
                parse_json_reply(&body).or_else(|_| parse_url_encoded_reply(&body))
            }
        };

        result.map_err(|e| {
            warn!("Unreadable {} token reply: {}", self.kind, e);
            e
        })
    }
}

/// Distinguish a revoked grant from any other rejection.
fn classify_rejection(kind: ProviderKind, status: reqwest::StatusCode, body: &str) -> Error {
    let revoked = matches!(status.as_u16(), 400 | 401) && body.contains("invalid_grant");
    if revoked {
        warn!(
            "{} refresh token revoked or expired (status {}); user must reconnect",
            kind, status
        );
        oauth_error(OAuthErrorKind::RefreshTokenRevoked, body)
    } else {
        warn!("{} token refresh failed with status {}: {}", kind, status, body);
        oauth_error(
            OAuthErrorKind::TokenRefreshFailed,
            &format!("status {status}: {body}"),
        )
    }
}

/// Accept `expires_in` as a number or a numeric string.
fn seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Lifetime of the new token; absent means the documented default, and a
/// non-positive value is rejected.
fn lifetime(raw: Option<i64>) -> Result<i64, Error> {
    match raw {
        None => Ok(DEFAULT_EXPIRES_IN_SECS),
        Some(secs) if secs > 0 => Ok(secs),
        Some(secs) => Err(oauth_error(
            OAuthErrorKind::InvalidResponse,
            &format!("non-positive expires_in {secs}"),
        )),
    }
}

fn parse_json_reply(body: &str) -> Result<RefreshResult, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
    })?;

    let access_token = value
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| oauth_error(OAuthErrorKind::InvalidResponse, "missing access_token"))?;

    let expires_in = lifetime(
        value
            .get("expires_in")
            .or_else(|| value.get("expires"))
            .and_then(seconds),
    )?;

    let refresh_token = value
        .get("refresh_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::new(token.to_string()));

    Ok(RefreshResult {
        access_token: SecretString::new(access_token.to_string()),
        expires_in,
        refresh_token,
    })
}

fn parse_url_encoded_reply(body: &str) -> Result<RefreshResult, Error> {
    let mut access_token = None;
    let mut expires_in = None;
    let mut refresh_token = None;

    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
            "expires_in" | "expires" => expires_in = value.parse().ok(),
            "refresh_token" if !value.is_empty() => refresh_token = Some(value.into_owned()),
            _ => {}
        }
    }

    let access_token = access_token
        .ok_or_else(|| oauth_error(OAuthErrorKind::InvalidResponse, "missing access_token"))?;

    Ok(RefreshResult {
        access_token: SecretString::new(access_token),
        expires_in: lifetime(expires_in)?,
        refresh_token: refresh_token.map(SecretString::new),
    })
}
