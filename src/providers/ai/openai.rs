//! OpenAI Provider Implementation
//!
//! Chat completions, vision (image parts on `gpt-4o-mini`) and Whisper
//! transcription against the official API or any compatible base URL.

use super::completions::{Completions, VendorDefaults};
use super::{AiProvider, ChatOptions, Prompt};
use crate::config::ProviderConfig;
use crate::envelope::{Envelope, Family};
use crate::error::Result;
use crate::providers::{Provider, ProviderContext, ProviderCore};
use async_trait::async_trait;

pub const NAME: &str = "openai";

const DEFAULTS: VendorDefaults = VendorDefaults {
    base_url: "https://api.openai.com/v1",
    model: "gpt-4o-mini",
    temperature: 0.7,
    max_tokens: 1000,
    vision_max_tokens: Some(300),
    transcription_model: Some("whisper-1"),
};

#[derive(Debug)]
pub struct OpenAiProvider {
    core: ProviderCore,
}

impl OpenAiProvider {
    /// Fails with `Configuration` when no API key is present under
    /// `credential_value`, `api_key` or `openai_api_key`.
    pub fn new(config: ProviderConfig, ctx: ProviderContext) -> Result<Self> {
        let core = ProviderCore::new(Family::Ai, NAME, config, &["openai_api_key"], ctx);
        core.validate_config()?;
        tracing::debug!("OpenAI provider ready at {}", core.base_url(DEFAULTS.base_url));
        Ok(Self { core })
    }

    fn completions(&self) -> Completions<'_> {
        Completions::new(&self.core, DEFAULTS)
    }
}

impl Provider for OpenAiProvider {
    fn core(&self) -> &ProviderCore {
        &self.core
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
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
