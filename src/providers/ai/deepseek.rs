//! DeepSeek Provider Implementation
//!
//! OpenAI-compatible chat only. Vision and transcription are reported as
//! `NOT_SUPPORTED` without touching the network. DeepSeek reports prompt
//! cache hits in `usage`, which feed the cache-efficiency log line.

use super::completions::{Completions, VendorDefaults};
use super::{AiProvider, ChatOptions, Prompt};
use crate::config::ProviderConfig;
use crate::envelope::{Envelope, Family};
use crate::error::Result;
use crate::providers::{Provider, ProviderContext, ProviderCore};
use async_trait::async_trait;

pub const NAME: &str = "deepseek";

const DEFAULTS: VendorDefaults = VendorDefaults {
    base_url: "https://api.deepseek.com",
    model: "deepseek-chat",
    temperature: 0.7,
    max_tokens: 2000,
    vision_max_tokens: None,
    transcription_model: None,
};

#[derive(Debug)]
pub struct DeepSeekProvider {
    core: ProviderCore,
}

impl DeepSeekProvider {
    pub fn new(config: ProviderConfig, ctx: ProviderContext) -> Result<Self> {
        let core = ProviderCore::new(Family::Ai, NAME, config, &["deepseek_api_key"], ctx);
        core.validate_config()?;
        Ok(Self { core })
    }

    fn completions(&self) -> Completions<'_> {
        Completions::new(&self.core, DEFAULTS)
    }
}

impl Provider for DeepSeekProvider {
    fn core(&self) -> &ProviderCore {
        &self.core
    }
}

#[async_trait]
impl AiProvider for DeepSeekProvider {
    async fn chat_completion(&self, prompt: Prompt, options: &ChatOptions) -> Envelope {
        self.completions().chat(prompt, options).await
    }

    async fn analyze_image(&self, image: &str, instruction: &str) -> Envelope {
        self.completions().analyze_image(image, instruction).await
    }

    async fn transcribe_audio(&self, audio_url: &str) -> Envelope {
        self.completions().transcribe(audio_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockHttpClient;
    use crate::i18n::DefaultCatalog;
    use serde_json::json;
    use std::sync::Arc;

    fn provider(mock: Arc<MockHttpClient>) -> DeepSeekProvider {
        let ctx = ProviderContext::new(mock, Arc::new(DefaultCatalog));
        DeepSeekProvider::new(ProviderConfig::new().with("deepseek_api_key", "ds-1"), ctx)
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_uses_deepseek_defaults() {
        let mock = Arc::new(MockHttpClient::new().respond_json(json!({
            "model": "deepseek-chat",
            "choices": [{"message": {"content": "pong"}}],
            "usage": {
                "prompt_tokens": 200,
                "prompt_cache_hit_tokens": 50,
                "prompt_cache_miss_tokens": 150,
                "total_tokens": 210
            }
        })));
        let provider = provider(mock.clone());

        let env = provider.chat_completion("ping".into(), &ChatOptions::new()).await;
        assert!(env.success);
        assert_eq!(env.get_str("response"), Some("pong"));
        assert_eq!(env.get("usage").unwrap()["prompt_cache_hit_tokens"], 50);

        let request = mock.last();
        assert_eq!(request.url, "https://api.deepseek.com/chat/completions");
        assert_eq!(request.header("Authorization"), Some("Bearer ds-1"));
        let body = request.json();
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_vision_and_transcription_not_supported() {
        let mock = Arc::new(MockHttpClient::new());
        let provider = provider(mock.clone());

        let env = provider.analyze_image("AAAA", "describe").await;
        assert!(!env.success);
        assert_eq!(env.error_code.as_deref(), Some("NOT_SUPPORTED"));

        let env = provider.transcribe_audio("https://cdn.test/a.mp3").await;
        assert!(!env.success);
        assert_eq!(env.error_code.as_deref(), Some("NOT_SUPPORTED"));
        assert_eq!(
            env.error.as_deref(),
            Some("deepseek does not support transcribe_audio")
        );

        assert_eq!(mock.call_count(), 0);
    }
}
