//! Read-only summary of credential expiry state for diagnostics.

use crate::error::Error;
use chrono::{DateTime, Duration, Utc};
use entity_api::{oauth_connection, platform_connection};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Counts for one credential population. Categories are disjoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHealth {
    pub total: usize,
    pub valid: usize,
    /// Expires after now but within the next hour.
    pub expiring_soon: usize,
    pub expired: usize,
    /// `valid / total * 100`, or 100 when there are no credentials.
    pub health_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHealthReport {
    pub generated_at: DateTime<Utc>,
    pub oauth_connections: TokenHealth,
    pub platform_connections: TokenHealth,
}

/// Classify expiries relative to `now`. A missing expiry never expires.
pub fn summarize<I>(expiries: I, now: DateTime<Utc>) -> TokenHealth
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    let soon = now + Duration::hours(1);
    let (mut valid, mut expiring_soon, mut expired) = (0, 0, 0);

    for expires_at in expiries {
        match expires_at {
            Some(at) if at <= now => expired += 1,
            Some(at) if at <= soon => expiring_soon += 1,
            _ => valid += 1,
        }
    }

    let total = valid + expiring_soon + expired;
    let health_score = if total == 0 {
        100.0
    } else {
        valid as f64 / total as f64 * 100.0
    };

    TokenHealth {
        total,
        valid,
        expiring_soon,
        expired,
        health_score,
    }
}

pub async fn report(db: &DatabaseConnection) -> Result<TokenHealthReport, Error> {
    let now = Utc::now();
    let accounts = oauth_connection::find_all(db).await?;
    let platforms = platform_connection::find_all(db).await?;

    Ok(TokenHealthReport {
        generated_at: now,
        oauth_connections: summarize(
            accounts
                .iter()
                .map(|c| c.token_expires_at.map(|at| at.with_timezone(&Utc))),
            now,
        ),
        platform_connections: summarize(
            platforms
                .iter()
                .map(|c| c.token_expires_at.map(|at| at.with_timezone(&Utc))),
            now,
        ),
    })
}
