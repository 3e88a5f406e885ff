//! Errors shared by the recording bot and content generator seams.

use std::fmt;

/// Failure talking to a recording bot or content generation backend.
///
/// Each backend maps its own failures onto these variants so callers never
/// match on vendor-specific errors.
#[derive(Debug)]
pub enum Error {
    /// API key rejected (401/403).
    Authentication(String),

    /// Connection could not be established or was dropped.
    Network(String),

    /// Unusable API key, region or base URL.
    Configuration(String),

    /// Backend answered with a status this crate does not handle.
    Provider(String),

    /// Backend did not answer within the request timeout.
    Timeout(String),

    /// Unknown bot id.
    NotFound(String),

    /// 429 from the backend.
    RateLimited { retry_after_seconds: u64 },

    /// Response body was not JSON.
    Deserialization(String),

    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether the same request may succeed on a later polling cycle.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout(_) | Error::RateLimited { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_includes_delay() {
        let err = Error::RateLimited {
            retry_after_seconds: 12,
        };
        assert_eq!(err.to_string(), "Rate limited: retry after 12s");
    }

    #[test]
    fn only_connectivity_failures_are_transient() {
        assert!(Error::Timeout("bot".into()).is_transient());
        assert!(Error::RateLimited {
            retry_after_seconds: 1
        }
        .is_transient());
        assert!(!Error::NotFound("bot".into()).is_transient());
        assert!(!Error::Authentication("key".into()).is_transient());
    }

    #[test]
    fn other_exposes_its_source() {
        use std::error::Error as _;
        let err = Error::Other("boom".into());
        assert!(err.source().is_some());
        assert!(Error::Timeout("bot".into()).source().is_none());
    }
}
