//! OAuth refresh adapters keyed by the credential's provider or platform tag.

use entity::{platform::Platform, provider::Provider as AccountProvider};
use meeting_auth::oauth::providers::{facebook, google, linkedin, twitter};
use meeting_auth::oauth::{ClientCredentials, Provider, ProviderKind};
use service::config::{Config, OAuthClientConfig};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;

/// Maps a primary account tag to its refresh adapter kind.
pub fn kind_for_account(provider: AccountProvider) -> ProviderKind {
    match provider {
        AccountProvider::Google => ProviderKind::Google,
    }
}

/// Maps a publishing platform tag to its refresh adapter kind.
pub fn kind_for_platform(platform: Platform) -> ProviderKind {
    match platform {
        Platform::LinkedIn => ProviderKind::LinkedIn,
        Platform::Facebook => ProviderKind::Facebook,
        Platform::Twitter => ProviderKind::Twitter,
    }
}

/// The refresh adapters that have client credentials configured.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an adapter for every provider whose client ID and secret are set.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let timeout = config.provider_request_timeout();
        let mut registry = Self::new();

        if let Some(client) = config.google_oauth() {
            let (credentials, url) = split(client);
            registry.register(Arc::new(google::Provider::new(credentials, url, timeout)?));
        }
        if let Some(client) = config.linkedin_oauth() {
            let (credentials, url) = split(client);
            registry.register(Arc::new(linkedin::Provider::new(credentials, url, timeout)?));
        }
        if let Some(client) = config.facebook_oauth() {
            let (credentials, url) = split(client);
            registry.register(Arc::new(facebook::Provider::new(credentials, url, timeout)?));
        }
        if let Some(client) = config.twitter_oauth() {
            let (credentials, url) = split(client);
            registry.register(Arc::new(twitter::Provider::new(credentials, url, timeout)?));
        }

        Ok(registry)
    }

    /// Add or replace the adapter for its provider kind.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.provider(), provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn Provider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn configured(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }
}

fn split(client: OAuthClientConfig) -> (ClientCredentials, String) {
    (
        ClientCredentials::new(client.client_id, client.client_secret),
        client.token_url,
    )
}
