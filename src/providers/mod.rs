//! External provider families
//!
//! Each family (AI completion, messaging, ad metrics) has a capability
//! trait. Concrete vendors hold a [`ProviderCore`] by composition for the
//! shared plumbing: credential extraction, validation and envelope
//! building.

pub mod ads;
pub mod ai;
pub mod base;
pub mod chat_api;

pub use base::{DEFAULT_CREDENTIAL_KEYS, ProviderCore};

use crate::envelope::Family;
use crate::error::Result;
use crate::http::{HttpClient, ReqwestHttpClient};
use crate::i18n::{DefaultCatalog, Translator};
use std::sync::Arc;

/// Collaborators shared by every provider instance
#[derive(Clone)]
pub struct ProviderContext {
    pub http: Arc<dyn HttpClient>,
    pub translator: Arc<dyn Translator>,
}

impl ProviderContext {
    pub fn new(http: Arc<dyn HttpClient>, translator: Arc<dyn Translator>) -> Self {
        Self { http, translator }
    }

    /// Same context with a different transport
    pub fn with_http(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    /// Same context with a different message catalog
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self {
            http: Arc::new(ReqwestHttpClient::new()),
            translator: Arc::new(DefaultCatalog),
        }
    }
}

/// Behaviour common to every provider, whatever its family.
pub trait Provider: Send + Sync {
    fn core(&self) -> &ProviderCore;

    /// Stable registration name (`openai`, `evolution`, ...)
    fn name(&self) -> &str {
        self.core().name()
    }

    fn family(&self) -> Family {
        self.core().family()
    }

    /// Re-check construction preconditions
    fn validate_config(&self) -> Result<()> {
        self.core().validate_config()
    }
}
