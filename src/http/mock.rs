//! In-memory [`HttpClient`] for unit tests: scripted responses, recorded calls.

use super::{HttpClient, HttpResponse, RequestBody, RequestOptions};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<RequestBody>,
    pub options: RequestOptions,
}

impl RecordedRequest {
    pub fn json(&self) -> &Value {
        match &self.body {
            Some(RequestBody::Json(v)) => v,
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.options
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<HttpResponse>>,
    downloads: Mutex<VecDeque<Result<Vec<u8>, ProviderError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn respond_json(self, data: Value) -> Self {
        self.respond(HttpResponse::ok(200, data))
    }

    pub fn download(self, bytes: Vec<u8>) -> Self {
        self.downloads.lock().unwrap().push_back(Ok(bytes));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post(&self, url: &str, body: RequestBody, options: RequestOptions) -> HttpResponse {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            body: Some(body),
            options,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| HttpResponse::transport_error("no scripted response"))
    }

    async fn get_bytes(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<Vec<u8>, ProviderError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            body: None,
            options,
        });
        self.downloads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transport("no scripted download".into())))
    }
}
