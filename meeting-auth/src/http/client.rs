//! Authenticated HTTP client builder with middleware.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;
use secrecy::{ExposeSecret, SecretString};

use super::TransientRetryPolicy;
use crate::error::{Error, ErrorKind, HttpErrorKind};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: format!("meeting-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Authenticated HTTP client with middleware.
pub type AuthenticatedClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for creating authenticated HTTP clients with middleware.
///
/// Provides a fluent API for constructing HTTP clients with:
/// - A default `Authorization` header (marked sensitive so it never shows in debug output)
/// - Retry logic for transient failures
/// - Timeout configuration
pub struct AuthenticatedClientBuilder {
    config: HttpClientConfig,
    authorization: Option<SecretString>,
}

impl AuthenticatedClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            authorization: None,
        }
    }

    /// Send this exact `Authorization` header value with every request,
    /// e.g. `Token <key>` or `Bearer <key>`.
    pub fn with_authorization(mut self, value: SecretString) -> Self {
        self.authorization = Some(value);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<AuthenticatedClient, Error> {
        let mut headers = HeaderMap::new();
        if let Some(authorization) = &self.authorization {
            let mut value =
                HeaderValue::from_str(authorization.expose_secret()).map_err(|e| Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .default_headers(headers)
            .build()?;

        // Retries share the request timeout rather than multiplying it
        let retry_policy =
            TransientRetryPolicy::new(self.config.max_retries).with_budget(self.config.timeout);
        let client_with_middleware = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(client_with_middleware)
    }
}

impl Default for AuthenticatedClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
