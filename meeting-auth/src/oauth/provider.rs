//! OAuth provider trait and types.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::token::RefreshResult;
use crate::error::Error;

/// OAuth providers whose tokens the refresher keeps alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    LinkedIn,
    Facebook,
    Twitter,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::LinkedIn => "linkedin",
            ProviderKind::Facebook => "facebook",
            ProviderKind::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth application credentials used on every refresh request.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }
}

/// Trait for OAuth 2.0 refresh adapters.
///
/// Implementations hide the platform's wire quirks (URL-encoded bodies,
/// Basic auth, aliased field names) behind one normalized result.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Exchange a refresh token for a new access token.
    ///
    /// A 400/401 reply carrying `invalid_grant` fails with
    /// [`crate::error::OAuthErrorKind::RefreshTokenRevoked`].
    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error>;
}
