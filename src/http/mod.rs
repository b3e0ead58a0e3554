//! HTTP boundary
//!
//! Providers never talk to `reqwest` directly; they go through [`HttpClient`]
//! so the transport can be swapped (and counted) in tests.

mod reqwest_client;

#[cfg(test)]
pub(crate) mod mock;

pub use reqwest_client::ReqwestHttpClient;

use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Per-call timeout used by every provider
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Outgoing request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`
    Json(Value),
    /// Sent verbatim (multipart uploads)
    Raw { content_type: String, bytes: Vec<u8> },
}

impl RequestBody {
    pub fn content_type(&self) -> &str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Raw { content_type, .. } => content_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// `Authorization: Bearer <token>`, whitespace trimmed from the token
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token.trim()))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Normalized HTTP outcome: `{success, httpCode, data|error}`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// 2xx received
    pub success: bool,
    /// HTTP status; 0 when the request never got a response
    pub status: u16,
    /// Parsed JSON body, when the body was JSON
    pub data: Option<Value>,
    /// Failure description (raw body for non-2xx, transport error otherwise)
    pub error: Option<String>,
}

impl HttpResponse {
    pub fn ok(status: u16, data: Value) -> Self {
        Self {
            success: true,
            status,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(status: u16, data: Option<Value>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            data,
            error: Some(error.into()),
        }
    }

    pub fn transport_error(error: impl Into<String>) -> Self {
        Self::failed(0, None, error)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `body` to `url`. Never fails: transport errors come back as
    /// `success = false, status = 0`.
    async fn post(&self, url: &str, body: RequestBody, options: RequestOptions) -> HttpResponse;

    /// Download raw bytes (used for audio transcription).
    async fn get_bytes(&self, url: &str, options: RequestOptions)
    -> Result<Vec<u8>, ProviderError>;
}
