//! # meeting-auth
//!
//! Credential plumbing for the reconciliation workers:
//! - OAuth 2.0 refresh adapters (Google, LinkedIn, Facebook, Twitter/X), each
//!   normalizing its provider's wire format into [`oauth::token::RefreshResult`]
//! - AES-256-GCM encryption of tokens stored at rest
//! - HTTP client building with timeout and transient-retry middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meeting_auth::{
//!     http::AuthenticatedClientBuilder,
//!     oauth::{providers::google, ClientCredentials, Provider},
//!     oauth::token::TokenCipher,
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
