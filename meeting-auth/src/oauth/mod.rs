//! OAuth 2.0 token refresh for the social-posting and calendar providers.
//!
//! Each provider adapter turns its platform's refresh reply into a single
//! normalized [`token::RefreshResult`].

mod provider;

pub mod providers;
pub mod token;

pub use provider::{ClientCredentials, Provider, ProviderKind};
