//! AI completion providers
//!
//! Chat completion, image analysis and audio transcription over
//! OpenAI-compatible vendor APIs.

mod completions;
pub mod deepseek;
mod multipart;
pub mod openai;

pub use deepseek::DeepSeekProvider;
pub use multipart::MultipartBody;
pub use openai::OpenAiProvider;

use super::Provider;
use crate::envelope::Envelope;
use crate::utils::round2;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[async_trait]
pub trait AiProvider: Provider {
    /// Chat completion: `{response, tokens_used, model, usage}` on success
    async fn chat_completion(&self, prompt: Prompt, options: &ChatOptions) -> Envelope;

    /// Describe an image (data URI or bare base64 JPEG):
    /// `{description, model, usage}` on success
    async fn analyze_image(&self, image: &str, instruction: &str) -> Envelope;

    /// Download `audio_url` and transcribe it: `{text}` on success
    async fn transcribe_audio(&self, audio_url: &str) -> Envelope;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// A user message carrying mixed parts (vision calls)
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// The accepted prompt shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// Already-built conversation
    Messages(Vec<Message>),
    /// Optional system instruction plus one user turn
    Pair { system: Option<String>, user: String },
    /// A bare user turn
    Text(String),
}

impl Prompt {
    pub fn pair(system: impl Into<String>, user: impl Into<String>) -> Self {
        Prompt::Pair {
            system: Some(system.into()),
            user: user.into(),
        }
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::Text(s.to_string())
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Prompt::Text(s)
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(messages: Vec<Message>) -> Self {
        Prompt::Messages(messages)
    }
}

/// Normalise any prompt shape to a message list. A blank system
/// instruction is dropped.
pub fn build_messages(prompt: Prompt) -> Vec<Message> {
    match prompt {
        Prompt::Messages(messages) => messages,
        Prompt::Pair { system, user } => {
            let mut messages = Vec::with_capacity(2);
            if let Some(system) = system
                && !system.trim().is_empty()
            {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(user));
            messages
        }
        Prompt::Text(text) => vec![Message::user(text)],
    }
}

/// Loose per-call options (`model`, `temperature`, `max_tokens`).
/// Values may arrive as strings from form input and are coerced on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatOptions {
    values: Map<String, Value>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(self, model: impl Into<String>) -> Self {
        self.set("model", Value::String(model.into()))
    }

    pub fn temperature(self, temperature: f64) -> Self {
        self.set("temperature", Value::from(temperature))
    }

    pub fn max_tokens(self, max_tokens: u32) -> Self {
        self.set("max_tokens", Value::from(max_tokens))
    }

    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

pub fn get_model(options: &ChatOptions, default: &str) -> String {
    options
        .get("model")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Temperature as a float; numeric strings accepted.
pub fn get_temperature(options: &ChatOptions, default: f64) -> f64 {
    match options.get("temperature") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Token ceiling as an integer; floats are truncated, numeric strings
/// accepted.
pub fn get_max_tokens(options: &ChatOptions, default: u32) -> u32 {
    let parsed = match options.get("max_tokens") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    };
    parsed
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(default)
}

/// Share of prompt tokens served from the vendor's prompt cache, e.g.
/// `"25%"` or `"33.33%"`. `"0%"` when there were no prompt tokens.
pub fn calculate_cache_efficiency(usage: &Value) -> String {
    let hits = usage["prompt_cache_hit_tokens"].as_f64().unwrap_or(0.0);
    let total = usage["prompt_tokens"].as_f64().unwrap_or(0.0);
    if total <= 0.0 {
        return "0%".to_string();
    }
    let pct = format!("{:.2}", round2(hits / total * 100.0));
    let pct = pct.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", pct)
}
