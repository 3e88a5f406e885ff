//! OAuth token types.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;

use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Lifetime assumed when a provider omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Result of a token refresh operation, normalized across providers.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    /// The new access token.
    pub access_token: SecretString,
    /// Seconds until the new access token expires.
    pub expires_in: i64,
    /// Present only when the provider issued a new refresh token.
    pub refresh_token: Option<SecretString>,
}

impl RefreshResult {
    /// True if the provider rotated the refresh token.
    pub fn refresh_token_rotated(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Absolute expiry of the new access token, counted from `now`.
    ///
    /// A lifetime that does not fit a timestamp is an invalid response.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
        TimeDelta::try_seconds(self.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                oauth_error(
                    OAuthErrorKind::InvalidResponse,
                    &format!("expires_in {} is out of range", self.expires_in),
                )
            })
    }
}
