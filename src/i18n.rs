//! User-facing message lookup
//!
//! Providers never hard-code user-facing error text; they look it up by a
//! stable key (e.g. `services.ai.http_error`) through a [`Translator`].
//! Placeholders use `:name` syntax.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub trait Translator: Send + Sync {
    /// Resolve `key`, substituting `:name` placeholders. Unknown keys should
    /// come back unchanged so missing catalog entries stay visible.
    fn lookup(&self, key: &str, placeholders: &[(&str, &str)]) -> String;
}

static ENGLISH: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Shared
        ("services.provider.missing_credential", "API key not configured for :provider"),
        ("services.provider.missing_instance", "Instance not configured for :provider"),
        ("services.provider.not_found", "Provider ':provider' is not available for :family"),
        ("services.provider.not_supported", ":provider does not support :operation"),
        ("services.provider.not_implemented", ":operation is not implemented yet for :provider"),
        ("services.provider.connection_error", "Could not reach :provider: :error"),
        // AI
        ("services.ai.http_error", "AI provider :provider returned HTTP :status: :error"),
        ("services.ai.invalid_response", "Invalid response from :provider: :error"),
        ("services.ai.download_failed", "Could not download audio: :error"),
        // Messaging
        ("services.chat_api.http_error", "Messaging API error (HTTP :status)"),
        ("services.chat_api.vendor_error", "Messaging API error: :error"),
        ("services.chat_api.unexpected_response", "Unexpected response from :provider: :error"),
        ("services.chat_api.invalid_presence", "Invalid presence type ':presence'. Allowed: :allowed"),
        ("services.chat_api.invalid_number", "Invalid phone number"),
        ("services.chat_api.simulated_connection", "Simulated connection failure"),
        ("services.chat_api.simulated_authentication", "Simulated authentication failure"),
        ("services.chat_api.simulated_rate_limit", "Simulated rate limit exceeded"),
        ("services.chat_api.simulated_invalid_number", "Simulated invalid number"),
        ("services.chat_api.simulated_media_error", "Simulated media processing error"),
        // Ads
        ("services.ads.invalid_asset_type", "Invalid asset type ':type'. Allowed: :allowed"),
        ("services.ads.invalid_date", "Invalid date ':date'"),
        ("services.ads.no_assets", "No assets given"),
    ])
});

/// Built-in English catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCatalog;

impl Translator for DefaultCatalog {
    fn lookup(&self, key: &str, placeholders: &[(&str, &str)]) -> String {
        match ENGLISH.get(key) {
            Some(template) => interpolate(template, placeholders),
            None => key.to_string(),
        }
    }
}

/// Catalog backed by an arbitrary map, falling back to [`DefaultCatalog`].
#[derive(Debug, Clone, Default)]
pub struct MapCatalog {
    entries: HashMap<String, String>,
}

impl MapCatalog {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl Translator for MapCatalog {
    fn lookup(&self, key: &str, placeholders: &[(&str, &str)]) -> String {
        match self.entries.get(key) {
            Some(template) => interpolate(template, placeholders),
            None => DefaultCatalog.lookup(key, placeholders),
        }
    }
}

/// Replace `:name` placeholders. Longer names go first so `:provider_id`
/// is not clobbered by `:provider`.
fn interpolate(template: &str, placeholders: &[(&str, &str)]) -> String {
    let mut ordered: Vec<&(&str, &str)> = placeholders.iter().collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    let mut out = template.to_string();
    for (name, value) in ordered {
        out = out.replace(&format!(":{}", name), value);
    }
    out
}
