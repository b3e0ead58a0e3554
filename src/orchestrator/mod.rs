//! Provider Orchestrators
//!
//! One [`Orchestrator`] per family resolves a provider by name (or the
//! family default), builds it on first use from a registered factory plus
//! the credentials a [`CredentialSource`] holds for that name, and keeps
//! the instance for the orchestrator's lifetime.
//!
//! Family-specific convenience calls live in [`ai`], [`chat_api`] and
//! [`ads`] as inherent impls on `Orchestrator<dyn AiProvider>` and friends.

pub mod ads;
pub mod ai;
pub mod chat_api;

use crate::config::{CredentialSource, ProviderConfig};
use crate::envelope::{Envelope, Family};
use crate::error::{ProviderError, Result};
use crate::providers::ProviderContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Builds a provider from its resolved config
pub type ProviderFactory<P> =
    Arc<dyn Fn(ProviderConfig, ProviderContext) -> Result<Arc<P>> + Send + Sync>;

pub struct Orchestrator<P: ?Sized + Send + Sync> {
    family: Family,
    default: RwLock<String>,
    factories: HashMap<String, ProviderFactory<P>>,
    cache: Mutex<HashMap<String, Arc<P>>>,
    credentials: Arc<dyn CredentialSource>,
    ctx: ProviderContext,
}

impl<P: ?Sized + Send + Sync> Orchestrator<P> {
    /// Empty orchestrator; register factories before resolving.
    pub fn new(
        family: Family,
        default: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
        ctx: ProviderContext,
    ) -> Self {
        Self {
            family,
            default: RwLock::new(normalize(&default.into())),
            factories: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
            credentials,
            ctx,
        }
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(ProviderConfig, ProviderContext) -> Result<Arc<P>> + Send + Sync + 'static,
    {
        let name = normalize(name);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&name);
        self.factories.insert(name, Arc::new(factory));
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Resolve `name` (or the default when `None`/blank).
    ///
    /// The first successful resolution of a name is cached and every later
    /// call returns the same instance. A factory error is returned as-is
    /// and nothing is cached, so a fixed configuration can be picked up on
    /// the next attempt.
    pub fn provider(&self, name: Option<&str>) -> Result<Arc<P>> {
        let name = self.resolve_name(name);

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(provider) = cache.get(&name) {
            return Ok(Arc::clone(provider));
        }

        let factory = self
            .factories
            .get(&name)
            .ok_or_else(|| ProviderError::not_found(&name, self.family.as_str()))?;
        let config = self
            .credentials
            .credentials(self.family, &name)
            .unwrap_or_default();

        match factory(config, self.ctx.clone()) {
            Ok(provider) => {
                tracing::debug!(family = %self.family, provider = %name, "Provider constructed");
                cache.insert(name, Arc::clone(&provider));
                Ok(provider)
            }
            Err(e) => {
                tracing::warn!(
                    family = %self.family,
                    provider = %name,
                    "Provider construction failed: {}",
                    e
                );
                Err(e)
            }
        }
    }

    /// Change the provider used when a call names none. Instances already
    /// handed out are unaffected.
    pub fn set_default(&self, name: &str) -> Result<()> {
        let name = normalize(name);
        if !self.factories.contains_key(&name) {
            return Err(ProviderError::not_found(name, self.family.as_str()));
        }
        tracing::info!(family = %self.family, provider = %name, "Default provider changed");
        *self.default.write().unwrap_or_else(PoisonError::into_inner) = name;
        Ok(())
    }

    pub fn default_name(&self) -> String {
        self.default
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registered names, sorted
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&normalize(name))
    }

    /// Error envelope for a failed resolution, tagged with the requested
    /// name so callers can branch on `success` as with any provider call.
    pub fn resolution_failure(&self, name: Option<&str>, err: &ProviderError) -> Envelope {
        let name = self.resolve_name(name);
        let message = match err {
            ProviderError::ProviderNotFound { provider, family } => self.ctx.translator.lookup(
                "services.provider.not_found",
                &[("provider", provider.as_str()), ("family", family.as_str())],
            ),
            ProviderError::Configuration { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Envelope::err(self.family, name, message, Some(err.code()))
    }

    fn resolve_name(&self, name: Option<&str>) -> String {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => normalize(name),
            None => self.default_name(),
        }
    }
}

impl<P: ?Sized + Send + Sync> fmt::Debug for Orchestrator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("family", &self.family)
            .field("default", &self.default_name())
            .field("available", &self.available())
            .finish()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
