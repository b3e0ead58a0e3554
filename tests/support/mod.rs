//! Shared helpers for tests that run providers against a mockito server.

#![allow(dead_code)]

use mockito::{Matcher, Server, ServerGuard};
use provider_hub::{ProviderConfig, ProviderContext};

/// Start an async mockito server
pub async fn start() -> ServerGuard {
    Server::new_async().await
}

/// Real reqwest transport and the English catalog
pub fn ctx() -> ProviderContext {
    ProviderContext::default()
}

pub fn regex(re: &str) -> Matcher {
    Matcher::Regex(re.to_string())
}

pub fn openai_config(server: &ServerGuard) -> ProviderConfig {
    ProviderConfig::new()
        .with("api_key", "sk-test")
        .with("base_url", server.url())
}

pub fn evolution_config(server: &ServerGuard) -> ProviderConfig {
    ProviderConfig::new()
        .with("apikey", "evo-key")
        .with("instance", "main")
        .with("base_url", format!("{}/", server.url()))
}
