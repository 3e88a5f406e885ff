//! OAuth token refresher: renews access tokens that expire within the buffer
//! window, for primary accounts and connected publishing platforms alike.

use crate::cycle_report::CycleReport;
use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use crate::gateway::oauth::{kind_for_account, kind_for_platform, ProviderRegistry};
use chrono::{DateTime, Utc};
use entity::{oauth_connections, platform_connections, Id};
use entity_api::{oauth_connection, platform_connection};
use log::*;
use meeting_auth::oauth::token::{RefreshResult, TokenCipher};
use meeting_auth::oauth::ProviderKind;
use sea_orm::DatabaseConnection;
use secrecy::ExposeSecret;
use service::config::Config;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which table a credential lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Population {
    Account,
    Platform,
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Population::Account => f.write_str("oauth connection"),
            Population::Platform => f.write_str("platform connection"),
        }
    }
}

/// One credential due for renewal, independent of its table.
#[derive(Debug, Clone)]
struct Candidate {
    population: Population,
    id: Id,
    provider: ProviderKind,
    sealed_refresh_token: Option<String>,
}

impl From<oauth_connections::Model> for Candidate {
    fn from(model: oauth_connections::Model) -> Self {
        Self {
            population: Population::Account,
            id: model.id,
            provider: kind_for_account(model.provider),
            sealed_refresh_token: model.refresh_token,
        }
    }
}

impl From<platform_connections::Model> for Candidate {
    fn from(model: platform_connections::Model) -> Self {
        Self {
            population: Population::Platform,
            id: model.id,
            provider: kind_for_platform(model.platform),
            sealed_refresh_token: model.refresh_token,
        }
    }
}

/// Encrypted column values to write after a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedTokenUpdate {
    pub access_token: String,
    /// `None` keeps the stored refresh token.
    pub refresh_token: Option<String>,
    pub token_expires_at: DateTime<Utc>,
}

/// Encrypt a provider's refresh result, counting its lifetime from `now`.
pub fn seal_refresh_result(
    cipher: &TokenCipher,
    result: &RefreshResult,
    now: DateTime<Utc>,
) -> Result<SealedTokenUpdate, Error> {
    let refresh_token = result
        .refresh_token
        .as_ref()
        .map(|token| cipher.seal(token.expose_secret()))
        .transpose()?;

    Ok(SealedTokenUpdate {
        access_token: cipher.seal(result.access_token.expose_secret())?,
        refresh_token,
        token_expires_at: result.expires_at(now)?,
    })
}

pub struct TokenRefresher {
    db: Arc<DatabaseConnection>,
    providers: ProviderRegistry,
    cipher: TokenCipher,
    expiry_buffer: Duration,
    request_timeout: Duration,
}

impl TokenRefresher {
    pub fn new(
        db: Arc<DatabaseConnection>,
        providers: ProviderRegistry,
        cipher: TokenCipher,
        expiry_buffer: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            db,
            providers,
            cipher,
            expiry_buffer,
            request_timeout,
        }
    }

    /// Wire the configured OAuth adapters and the token encryption key.
    pub fn from_config(db: Arc<DatabaseConnection>, config: &Config) -> Result<Self, Error> {
        let key = config
            .encryption_key()
            .ok_or_else(|| Error::config("ENCRYPTION_KEY is not set"))?;
        let cipher = TokenCipher::from_hex_key(&key)?;
        let providers = ProviderRegistry::from_config(config)?;

        if providers.configured().is_empty() {
            warn!("No OAuth client credentials configured; every refresh will fail");
        } else {
            info!("OAuth refresh configured for {:?}", providers.configured());
        }

        Ok(Self::new(
            db,
            providers,
            cipher,
            config.token_expiry_buffer(),
            config.provider_request_timeout(),
        ))
    }

    /// Refresh every credential expiring within the buffer window.
    ///
    /// Only the candidate queries can fail the cycle; a failure for one
    /// credential is logged and counted.
    pub async fn run_cycle(&self) -> Result<CycleReport, Error> {
        let cutoff = chrono::Duration::from_std(self.expiry_buffer)
            .ok()
            .and_then(|buffer| Utc::now().checked_add_signed(buffer))
            .ok_or_else(|| {
                Error::config(&format!(
                    "token expiry buffer {:?} is out of range",
                    self.expiry_buffer
                ))
            })?;

        let accounts = oauth_connection::find_refreshable(&self.db, cutoff).await?;
        let platforms = platform_connection::find_refreshable(&self.db, cutoff).await?;

        let candidates: Vec<Candidate> = accounts
            .into_iter()
            .map(Candidate::from)
            .chain(platforms.into_iter().map(Candidate::from))
            .collect();
        let mut report = CycleReport::new(candidates.len());

        for candidate in &candidates {
            let outcome = self.refresh(candidate).await;
            if let Err(e) = &outcome {
                log_failure(candidate, e);
            }
            report.record(&outcome);
        }

        info!("Token refresh cycle: {report}");
        Ok(report)
    }

    async fn refresh(&self, candidate: &Candidate) -> Result<(), Error> {
        let sealed = candidate.sealed_refresh_token.as_deref().ok_or_else(|| Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "no refresh token stored".to_string(),
            )),
        })?;
        let provider = self.providers.get(candidate.provider).ok_or_else(|| {
            Error::config(&format!(
                "no OAuth client configured for {}",
                candidate.provider
            ))
        })?;

        let refresh_token = self.cipher.open(sealed)?;

        let result = tokio::time::timeout(
            self.request_timeout,
            provider.refresh_token(&refresh_token),
        )
        .await
        .map_err(|_| {
            Error::timeout(format!(
                "{} token refresh exceeded {:?}",
                candidate.provider, self.request_timeout
            ))
        })??;

        let update = seal_refresh_result(&self.cipher, &result, Utc::now())?;

        match candidate.population {
            Population::Account => {
                oauth_connection::update_tokens(
                    &self.db,
                    candidate.id,
                    update.access_token,
                    update.refresh_token,
                    update.token_expires_at,
                )
                .await?;
            }
            Population::Platform => {
                platform_connection::update_tokens(
                    &self.db,
                    candidate.id,
                    update.access_token,
                    update.refresh_token,
                    update.token_expires_at,
                )
                .await?;
            }
        }

        info!(
            "Refreshed {} {} ({}), expires at {}{}",
            candidate.population,
            candidate.id,
            candidate.provider,
            update.token_expires_at,
            if result.refresh_token_rotated() {
                ", refresh token rotated"
            } else {
                ""
            }
        );
        Ok(())
    }
}

fn log_failure(candidate: &Candidate, err: &Error) {
    if err.is_not_found() {
        info!(
            "Skipping {} {}: removed during refresh",
            candidate.population, candidate.id
        );
    } else if err.error_kind == DomainErrorKind::External(ExternalErrorKind::RefreshTokenRevoked) {
        warn!(
            "Refresh token for {} {} ({}) was revoked; the user must reconnect",
            candidate.population, candidate.id, candidate.provider
        );
    } else {
        warn!(
            "Token refresh failed for {} {} ({}): {err}",
            candidate.population, candidate.id, candidate.provider
        );
    }
}


#[cfg(test)]
#[cfg(feature = "mock")]
mod cycle_tests {
    use super::*;
    use async_trait::async_trait;
    use entity::{platform::Platform, provider::Provider as AccountProvider};
    use meeting_auth::error::{oauth_error, OAuthErrorKind};
    use meeting_auth::oauth::Provider;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use secrecy::SecretString;
    use std::sync::Mutex;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    /// Records the refresh tokens it receives and answers with `a2`, by
    /// default valid for 3600s.
    struct FakeProvider {
        kind: ProviderKind,
        revoked: bool,
        expires_in: i64,
        received: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn new(kind: ProviderKind) -> Self {
            Self {
                kind,
                revoked: false,
                expires_in: 3600,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        fn provider(&self) -> ProviderKind {
            self.kind
        }

        async fn refresh_token(
            &self,
            refresh_token: &str,
        ) -> Result<RefreshResult, meeting_auth::Error> {
            self.received.lock().unwrap().push(refresh_token.to_string());
            if self.revoked {
                return Err(oauth_error(
                    OAuthErrorKind::RefreshTokenRevoked,
                    r#"{"error":"invalid_grant"}"#,
                ));
            }
            Ok(RefreshResult {
                access_token: SecretString::new("a2".to_string()),
                expires_in: self.expires_in,
                refresh_token: None,
            })
        }
    }

    fn cipher() -> TokenCipher {
        TokenCipher::from_hex_key(TEST_KEY).unwrap()
    }

    fn account(cipher: &TokenCipher) -> oauth_connections::Model {
        let now = Utc::now();
        oauth_connections::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            provider: AccountProvider::Google,
            external_email: Some("coach@example.com".to_string()),
            access_token: cipher.seal("a1").unwrap(),
            refresh_token: Some(cipher.seal("r1").unwrap()),
            token_expires_at: Some((now + chrono::Duration::minutes(5)).into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn platform(cipher: &TokenCipher, platform: Platform) -> platform_connections::Model {
        let now = Utc::now();
        platform_connections::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            platform,
            account_name: Some("Acme".to_string()),
            access_token: cipher.seal("pa1").unwrap(),
            refresh_token: Some(cipher.seal("pr1").unwrap()),
            token_expires_at: Some((now + chrono::Duration::minutes(1)).into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn refresher(db: DatabaseConnection, providers: ProviderRegistry) -> TokenRefresher {
        TokenRefresher::new(
            Arc::new(db),
            providers,
            cipher(),
            Duration::from_secs(600),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn expiring_account_is_refreshed_with_decrypted_token() {
        let cipher = cipher();
        let account = account(&cipher);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![account.clone()]])
            .append_query_results::<platform_connections::Model, Vec<_>, _>(vec![vec![]])
            .append_query_results(vec![vec![account.clone()]])
            .append_query_results(vec![vec![account.clone()]])
            .into_connection();

        let google = Arc::new(FakeProvider::new(ProviderKind::Google));
        let mut providers = ProviderRegistry::new();
        providers.register(google.clone());

        let report = refresher(db, providers).run_cycle().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                candidates: 1,
                succeeded: 1,
                failed: 0
            }
        );
        assert_eq!(*google.received.lock().unwrap(), vec!["r1".to_string()]);
    }

    /// The `SET ...` part of an UPDATE, without its WHERE and RETURNING clauses.
    fn set_clause(sql: &str) -> &str {
        let start = sql.find(" SET ").unwrap_or(0);
        let end = sql.find(" WHERE ").unwrap_or(sql.len());
        &sql[start..end]
    }

    #[tokio::test]
    async fn refresh_writes_sealed_access_token_and_keeps_refresh_token() {
        let cipher = cipher();
        let account = account(&cipher);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![account.clone()]])
                .append_query_results::<platform_connections::Model, Vec<_>, _>(vec![vec![]])
                .append_query_results(vec![vec![account.clone()]])
                .append_query_results(vec![vec![account.clone()]])
                .into_connection(),
        );

        let mut providers = ProviderRegistry::new();
        providers.register(Arc::new(FakeProvider::new(ProviderKind::Google)));
        let refresher = TokenRefresher::new(
            db.clone(),
            providers,
            cipher.clone(),
            Duration::from_secs(600),
            Duration::from_secs(5),
        );

        let before = Utc::now();
        let report = refresher.run_cycle().await.unwrap();
        drop(refresher);
        assert_eq!(report.succeeded, 1);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let update = log
            .iter()
            .flat_map(|txn| txn.statements())
            .find(|stmt| stmt.sql.starts_with("UPDATE"))
            .expect("the refresh should issue an UPDATE");

        let set = set_clause(&update.sql);
        assert!(set.contains(r#""access_token""#), "{set}");
        assert!(set.contains(r#""token_expires_at""#), "{set}");
        assert!(!set.contains(r#""refresh_token""#), "{set}");

        let values = &update.values.as_ref().unwrap().0;
        let sealed: Vec<&str> = values
            .iter()
            .filter_map(|value| match value {
                Value::String(Some(s)) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(sealed.len(), 1);
        assert_eq!(cipher.open(sealed[0]).unwrap(), "a2");

        let expires_at = values
            .iter()
            .find_map(|value| match value {
                Value::ChronoDateTimeWithTimeZone(Some(at)) => Some(at.with_timezone(&Utc)),
                _ => None,
            })
            .unwrap();
        let expected = before + chrono::Duration::seconds(3600);
        assert!((expires_at - expected).num_seconds().abs() < 5);
    }

    #[tokio::test]
    async fn out_of_range_expiry_fails_only_its_own_credential() {
        let cipher = cipher();
        let account = account(&cipher);
        let linkedin = platform(&cipher, Platform::LinkedIn);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![account.clone()]])
            .append_query_results(vec![vec![linkedin.clone()]])
            .append_query_results(vec![vec![linkedin.clone()]])
            .append_query_results(vec![vec![linkedin.clone()]])
            .into_connection();

        let mut google = FakeProvider::new(ProviderKind::Google);
        google.expires_in = i64::MAX;
        let linkedin_provider = Arc::new(FakeProvider::new(ProviderKind::LinkedIn));
        let mut providers = ProviderRegistry::new();
        providers.register(Arc::new(google));
        providers.register(linkedin_provider.clone());

        let report = refresher(db, providers).run_cycle().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                candidates: 2,
                succeeded: 1,
                failed: 1
            }
        );
        assert_eq!(
            *linkedin_provider.received.lock().unwrap(),
            vec!["pr1".to_string()]
        );
    }

    #[tokio::test]
    async fn unconfigured_platform_fails_without_stopping_the_cycle() {
        let cipher = cipher();
        let twitter = platform(&cipher, Platform::Twitter);
        let linkedin = platform(&cipher, Platform::LinkedIn);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<oauth_connections::Model, Vec<_>, _>(vec![vec![]])
            .append_query_results(vec![vec![twitter.clone(), linkedin.clone()]])
            .append_query_results(vec![vec![linkedin.clone()]])
            .append_query_results(vec![vec![linkedin.clone()]])
            .into_connection();

        let linkedin_provider = Arc::new(FakeProvider::new(ProviderKind::LinkedIn));
        let mut providers = ProviderRegistry::new();
        providers.register(linkedin_provider.clone());

        let report = refresher(db, providers).run_cycle().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                candidates: 2,
                succeeded: 1,
                failed: 1
            }
        );
        assert_eq!(
            *linkedin_provider.received.lock().unwrap(),
            vec!["pr1".to_string()]
        );
    }

    #[tokio::test]
    async fn revoked_refresh_token_is_counted_and_not_written() {
        let cipher = cipher();
        let account = account(&cipher);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![account.clone()]])
            .append_query_results::<platform_connections::Model, Vec<_>, _>(vec![vec![]])
            .into_connection();
        let db = Arc::new(db);

        let mut google = FakeProvider::new(ProviderKind::Google);
        google.revoked = true;
        let mut providers = ProviderRegistry::new();
        providers.register(Arc::new(google));

        let refresher = TokenRefresher::new(
            db.clone(),
            providers,
            cipher,
            Duration::from_secs(600),
            Duration::from_secs(5),
        );
        let report = refresher.run_cycle().await.unwrap();
        drop(refresher);

        assert_eq!(report.failed, 1);
        // only the two candidate queries
        let db = Arc::try_unwrap(db).unwrap();
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn connection_removed_mid_cycle_is_skipped() {
        let cipher = cipher();
        let account = account(&cipher);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![account.clone()]])
            .append_query_results::<platform_connections::Model, Vec<_>, _>(vec![vec![]])
            .append_query_results::<oauth_connections::Model, Vec<_>, _>(vec![vec![]])
            .into_connection();

        let mut providers = ProviderRegistry::new();
        providers.register(Arc::new(FakeProvider::new(ProviderKind::Google)));

        let report = refresher(db, providers).run_cycle().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 0);
    }
}
