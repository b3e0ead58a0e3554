//! AI orchestrator: `openai` (default) and `deepseek`.

use super::Orchestrator;
use crate::config::{Config, CredentialSource};
use crate::envelope::{Envelope, Family};
use crate::error::Result;
use crate::providers::ProviderContext;
use crate::providers::ai::{
    AiProvider, ChatOptions, DeepSeekProvider, OpenAiProvider, Prompt, deepseek, openai,
};
use std::sync::Arc;

pub type AiOrchestrator = Orchestrator<dyn AiProvider>;

impl Orchestrator<dyn AiProvider> {
    pub fn with_builtin_providers(
        credentials: Arc<dyn CredentialSource>,
        ctx: ProviderContext,
    ) -> Self {
        let mut orch = Self::new(Family::Ai, openai::NAME, credentials, ctx);
        orch.register(openai::NAME, |config, ctx| {
            Ok(Arc::new(OpenAiProvider::new(config, ctx)?) as Arc<dyn AiProvider>)
        });
        orch.register(deepseek::NAME, |config, ctx| {
            Ok(Arc::new(DeepSeekProvider::new(config, ctx)?) as Arc<dyn AiProvider>)
        });
        orch
    }

    /// Built-in providers with credentials and default taken from `config`
    pub fn from_config(config: &Config, ctx: ProviderContext) -> Result<Self> {
        let orch = Self::with_builtin_providers(Arc::new(config.clone()), ctx);
        if let Some(default) = &config.ai.default {
            orch.set_default(default)?;
        }
        Ok(orch)
    }

    pub async fn chat(
        &self,
        provider: Option<&str>,
        prompt: impl Into<Prompt>,
        options: &ChatOptions,
    ) -> Envelope {
        match self.provider(provider) {
            Ok(p) => p.chat_completion(prompt.into(), options).await,
            Err(e) => self.resolution_failure(provider, &e),
        }
    }

    pub async fn analyze_image(
        &self,
        provider: Option<&str>,
        image: &str,
        instruction: &str,
    ) -> Envelope {
        match self.provider(provider) {
            Ok(p) => p.analyze_image(image, instruction).await,
            Err(e) => self.resolution_failure(provider, &e),
        }
    }

    pub async fn transcribe(&self, provider: Option<&str>, audio_url: &str) -> Envelope {
        match self.provider(provider) {
            Ok(p) => p.transcribe_audio(audio_url).await,
            Err(e) => self.resolution_failure(provider, &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, StaticCredentials};
    use crate::http::mock::MockHttpClient;
    use crate::i18n::DefaultCatalog;
    use crate::providers::Provider;
    use serde_json::json;

    fn ctx(mock: Arc<MockHttpClient>) -> ProviderContext {
        ProviderContext::new(mock, Arc::new(DefaultCatalog))
    }

    #[tokio::test]
    async fn test_chat_through_default() {
        let mock = Arc::new(MockHttpClient::new().respond_json(json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": " hello "}}],
            "usage": {"total_tokens": 7}
        })));
        let credentials = StaticCredentials::new().with(
            Family::Ai,
            "openai",
            ProviderConfig::new().with("api_key", "sk-test"),
        );
        let orch = AiOrchestrator::with_builtin_providers(Arc::new(credentials), ctx(mock.clone()));

        let env = orch.chat(None, "hi", &ChatOptions::new()).await;
        assert!(env.success);
        assert_eq!(env.get_str("response"), Some("hello"));
        assert_eq!(env.to_value()["provider"], "openai");
        assert!(orch.is_cached("openai"));
        assert_eq!(orch.available(), vec!["deepseek".to_string(), "openai".to_string()]);
    }

    #[tokio::test]
    async fn test_resolution_errors_become_envelopes() {
        let mock = Arc::new(MockHttpClient::new());
        let orch = AiOrchestrator::with_builtin_providers(
            Arc::new(StaticCredentials::new()),
            ctx(mock.clone()),
        );

        let env = orch.transcribe(Some("deepseek"), "https://cdn.test/a.mp3").await;
        assert!(!env.success);
        assert_eq!(env.error_code.as_deref(), Some("CONFIGURATION_ERROR"));
        assert_eq!(env.error.as_deref(), Some("API key not configured for deepseek"));

        let env = orch.analyze_image(Some("claude"), "AAAA", "describe").await;
        assert_eq!(env.error_code.as_deref(), Some("PROVIDER_NOT_FOUND"));
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_from_config_applies_default() {
        let config = Config::from_toml_str(
            r#"
[ai]
default = "deepseek"

[ai.providers.deepseek]
api_key = "ds-key"
"#,
        )
        .unwrap();
        let orch = AiOrchestrator::from_config(&config, ctx(Arc::new(MockHttpClient::new()))).unwrap();
        assert_eq!(orch.default_name(), "deepseek");
        assert_eq!(orch.provider(None).unwrap().name(), "deepseek");

        let config = Config::from_toml_str("[ai]\ndefault = \"mistral\"\n").unwrap();
        let err = AiOrchestrator::from_config(&config, ctx(Arc::new(MockHttpClient::new()))).unwrap_err();
        assert_eq!(err.code(), "PROVIDER_NOT_FOUND");
    }
}
