//! Credential sources
//!
//! Orchestrators ask a [`CredentialSource`] for a provider's
//! [`ProviderConfig`] the first time the provider is resolved.

use super::provider::ProviderConfig;
use crate::envelope::Family;
use std::collections::HashMap;

pub trait CredentialSource: Send + Sync {
    /// Configuration for provider `name` in `family`, if any is known.
    fn credentials(&self, family: Family, name: &str) -> Option<ProviderConfig>;
}

/// In-memory source, mostly for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    entries: HashMap<(Family, String), ProviderConfig>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, family: Family, name: impl Into<String>, config: ProviderConfig) -> Self {
        self.insert(family, name, config);
        self
    }

    pub fn insert(&mut self, family: Family, name: impl Into<String>, config: ProviderConfig) {
        self.entries.insert((family, name.into()), config);
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self, family: Family, name: &str) -> Option<ProviderConfig> {
        self.entries.get(&(family, name.to_string())).cloned()
    }
}
