//! OpenAI-compatible `/chat/completions` and `/audio/transcriptions` calls,
//! shared by every AI vendor that speaks that protocol.

use super::{
    ChatOptions, ContentPart, ImageUrl, Message, MultipartBody, Prompt, build_messages,
    calculate_cache_efficiency, get_max_tokens, get_model, get_temperature,
};
use crate::envelope::Envelope;
use crate::error::{ProviderError, Result};
use crate::http::{RequestBody, RequestOptions};
use crate::providers::ProviderCore;
use crate::providers::chat_api::media::{extension_of, get_mime_type};
use serde_json::{Value, json};

/// Fixed per-vendor defaults
#[derive(Debug, Clone, Copy)]
pub(crate) struct VendorDefaults {
    pub base_url: &'static str,
    pub model: &'static str,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Token cap for vision calls; `None` when the vendor has no vision
    pub vision_max_tokens: Option<u32>,
    /// Speech-to-text model; `None` when the vendor cannot transcribe
    pub transcription_model: Option<&'static str>,
}

pub(crate) struct Completions<'a> {
    core: &'a ProviderCore,
    defaults: VendorDefaults,
    base_url: String,
}

impl<'a> Completions<'a> {
    pub fn new(core: &'a ProviderCore, defaults: VendorDefaults) -> Self {
        Self {
            core,
            defaults,
            base_url: core.base_url(defaults.base_url),
        }
    }

    fn auth(&self) -> RequestOptions {
        RequestOptions::new().bearer(self.core.credential().expose_secret())
    }

    pub async fn chat(&self, prompt: Prompt, options: &ChatOptions) -> Envelope {
        match self.try_chat(prompt, options).await {
            Ok(data) => self.core.success(data),
            Err(e) => self.core.fail(&e),
        }
    }

    async fn try_chat(&self, prompt: Prompt, options: &ChatOptions) -> Result<Value> {
        let messages = build_messages(prompt);
        let model = get_model(options, self.defaults.model);
        let temperature = get_temperature(options, self.defaults.temperature);
        let max_tokens = get_max_tokens(options, self.defaults.max_tokens);

        self.core.log(
            "chat completion request",
            &json!({"model": model, "messages": messages.len(), "max_tokens": max_tokens}),
        );

        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });
        let data = self.post_completion(body).await?;

        let content = message_content(&data)?;
        let usage = data.get("usage").cloned().unwrap_or(Value::Null);
        if usage.get("prompt_cache_hit_tokens").is_some() {
            self.core.log(
                "prompt cache efficiency",
                &json!({
                    "efficiency": calculate_cache_efficiency(&usage),
                    "hit_tokens": usage["prompt_cache_hit_tokens"],
                    "miss_tokens": usage["prompt_cache_miss_tokens"],
                }),
            );
        }

        Ok(json!({
            "response": content.trim(),
            "tokens_used": usage["total_tokens"].as_u64().unwrap_or(0),
            "model": data["model"].as_str().unwrap_or(model.as_str()),
            "usage": usage,
        }))
    }

    pub async fn analyze_image(&self, image: &str, instruction: &str) -> Envelope {
        match self.try_analyze_image(image, instruction).await {
            Ok(data) => self.core.success(data),
            Err(e) => self.core.fail(&e),
        }
    }

    async fn try_analyze_image(&self, image: &str, instruction: &str) -> Result<Value> {
        let max_tokens = self
            .defaults
            .vision_max_tokens
            .ok_or_else(|| ProviderError::unsupported(self.core.name(), "analyze_image"))?;

        let url = if image.starts_with("data:") {
            image.to_string()
        } else {
            format!("data:image/jpeg;base64,{}", image)
        };
        let message = Message::user_parts(vec![
            ContentPart::Text {
                text: instruction.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url },
            },
        ]);
        let model = self.defaults.model;

        self.core.log(
            "image analysis request",
            &json!({"model": model, "image_bytes": image.len()}),
        );

        let data = self
            .post_completion(json!({
                "model": model,
                "messages": [message],
                "max_tokens": max_tokens,
            }))
            .await?;
        let content = message_content(&data)?;

        Ok(json!({
            "description": content.trim(),
            "model": data["model"].as_str().unwrap_or(model),
            "usage": data.get("usage").cloned().unwrap_or(Value::Null),
        }))
    }

    pub async fn transcribe(&self, audio_url: &str) -> Envelope {
        let Some(model) = self.defaults.transcription_model else {
            return self
                .core
                .fail(&ProviderError::unsupported(self.core.name(), "transcribe_audio"));
        };

        let audio = match self
            .core
            .http()
            .get_bytes(audio_url, RequestOptions::new())
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                let error = e.to_string();
                let message = self
                    .core
                    .t("services.ai.download_failed", &[("error", error.as_str())]);
                return self.core.error(message, Some(e.code()));
            }
        };

        match self.try_transcribe(audio_url, audio, model).await {
            Ok(data) => self.core.success(data),
            Err(e) => self.core.fail(&e),
        }
    }

    async fn try_transcribe(&self, audio_url: &str, audio: Vec<u8>, model: &str) -> Result<Value> {
        let ext = extension_of(audio_url).unwrap_or_else(|| "mp3".to_string());
        let filename = format!("audio.{}", ext);

        self.core.log(
            "transcription request",
            &json!({"model": model, "bytes": audio.len(), "filename": filename}),
        );

        let body = MultipartBody::new()
            .file("file", filename, get_mime_type(&ext), audio)
            .field("model", model);

        let url = format!("{}/audio/transcriptions", self.base_url);
        let response = self
            .core
            .http()
            .post(&url, body.into_request_body(), self.auth())
            .await;
        let data = self.core.check_http(response)?;

        let text = data["text"]
            .as_str()
            .ok_or_else(|| ProviderError::InvalidResponse("missing text".into()))?;
        Ok(json!({"text": text.trim()}))
    }

    async fn post_completion(&self, body: Value) -> Result<Value> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .core
            .http()
            .post(&url, RequestBody::Json(body), self.auth())
            .await;
        self.core.check_http(response)
    }
}

/// `choices[0].message.content`, which must be a string
fn message_content(data: &Value) -> Result<&str> {
    data["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            ProviderError::InvalidResponse("missing choices[0].message.content".into())
        })
}
