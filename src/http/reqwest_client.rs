//! `reqwest`-backed [`HttpClient`]

use super::{HttpClient, HttpResponse, RequestBody, RequestOptions};
use crate::error::ProviderError;
use crate::utils::truncate_str;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Shared, reentrant client. One connection pool for every provider.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build tuned HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post(&self, url: &str, body: RequestBody, options: RequestOptions) -> HttpResponse {
        let mut request = self
            .client
            .post(url)
            .timeout(options.timeout)
            .header(reqwest::header::CONTENT_TYPE, body.content_type());
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match body {
            RequestBody::Json(value) => match serde_json::to_vec(&value) {
                Ok(bytes) => request.body(bytes),
                Err(e) => return HttpResponse::transport_error(format!("Invalid JSON body: {}", e)),
            },
            RequestBody::Raw { bytes, .. } => request.body(bytes),
        };

        tracing::debug!("POST {}", url);
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("POST {} failed: {}", url, e);
                return HttpResponse::transport_error(e.to_string());
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let data = serde_json::from_str(&text).ok();
        tracing::debug!("POST {} -> {}", url, status);

        if status.is_success() {
            HttpResponse {
                success: true,
                status: status.as_u16(),
                data: Some(data.unwrap_or(serde_json::Value::String(text))),
                error: None,
            }
        } else {
            HttpResponse::failed(status.as_u16(), data, truncate_str(&text, 500))
        }
    }

    async fn get_bytes(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<Vec<u8>, ProviderError> {
        let mut request = self.client.get(url).timeout(options.timeout);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message: format!("download failed: {}", url),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
