//! Synthetic messaging provider
//!
//! Implements the full messaging contract without any network access:
//! each call sleeps for `latency_ms` (default 100) and then either succeeds
//! with a generated message id or, when `simulate_error` is set, fails with
//! the code selected by `error_type`. Useful as a conformance fixture for
//! new messaging providers and for exercising callers offline.

use super::{ChatApiProvider, OutgoingMessage, PresenceType, require_number};
use crate::config::ProviderConfig;
use crate::envelope::{Envelope, Family};
use crate::error::Result;
use crate::providers::{Provider, ProviderContext, ProviderCore};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const NAME: &str = "test";

const DEFAULT_LATENCY_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedError {
    Connection,
    Authentication,
    RateLimit,
    InvalidNumber,
    MediaError,
}

impl SimulatedError {
    /// Unknown names fall back to `Connection`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "authentication" => SimulatedError::Authentication,
            "rate_limit" => SimulatedError::RateLimit,
            "invalid_number" => SimulatedError::InvalidNumber,
            "media_error" => SimulatedError::MediaError,
            _ => SimulatedError::Connection,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SimulatedError::Connection => "CONNECTION_ERROR",
            SimulatedError::Authentication => "AUTHENTICATION_FAILED",
            SimulatedError::RateLimit => "RATE_LIMIT_EXCEEDED",
            SimulatedError::InvalidNumber => "INVALID_NUMBER",
            SimulatedError::MediaError => "MEDIA_ERROR",
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            SimulatedError::Connection => "services.chat_api.simulated_connection",
            SimulatedError::Authentication => "services.chat_api.simulated_authentication",
            SimulatedError::RateLimit => "services.chat_api.simulated_rate_limit",
            SimulatedError::InvalidNumber => "services.chat_api.simulated_invalid_number",
            SimulatedError::MediaError => "services.chat_api.simulated_media_error",
        }
    }
}

#[derive(Debug)]
pub struct TestChatProvider {
    core: ProviderCore,
    latency: Duration,
    simulated_error: Option<SimulatedError>,
    calls: AtomicUsize,
}

impl TestChatProvider {
    pub fn new(config: ProviderConfig, ctx: ProviderContext) -> Result<Self> {
        let core = ProviderCore::new(Family::ChatApi, NAME, config, &["apikey", "token"], ctx);
        core.validate_config()?;

        let config = core.config();
        let latency = Duration::from_millis(config.get_u64("latency_ms").unwrap_or(DEFAULT_LATENCY_MS));
        let simulated_error = config
            .get_bool("simulate_error")
            .unwrap_or(false)
            .then(|| SimulatedError::from_name(&config.get_str("error_type").unwrap_or_default()));

        Ok(Self {
            core,
            latency,
            simulated_error,
            calls: AtomicUsize::new(0),
        })
    }

    /// Operations invoked so far, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn simulated_error(&self) -> Option<SimulatedError> {
        self.simulated_error
    }

    /// Bookkeeping shared by every operation: count, re-validate, wait,
    /// then fail if an error mode is configured.
    async fn simulate(&self, operation: &str) -> std::result::Result<(), Envelope> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.core.log(operation, &json!({"latency_ms": self.latency.as_millis() as u64}));

        if let Err(e) = self.core.validate_config() {
            return Err(self.core.fail(&e));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.simulated_error {
            Some(kind) => Err(self.core.error(self.core.t(kind.message_key(), &[]), Some(kind.code()))),
            None => Ok(()),
        }
    }

    fn finish(&self, result: Result<Value>) -> Envelope {
        match result {
            Ok(data) => self.core.success(data),
            Err(e) => self.core.fail(&e),
        }
    }

    fn fake_message_id() -> String {
        format!("TEST{}", uuid::Uuid::new_v4().simple()).to_uppercase()
    }
}

impl Provider for TestChatProvider {
    fn core(&self) -> &ProviderCore {
        &self.core
    }
}

#[async_trait]
impl ChatApiProvider for TestChatProvider {
    async fn send_message(&self, number: &str, message: &OutgoingMessage) -> Envelope {
        if let Err(envelope) = self.simulate("send_message").await {
            return envelope;
        }
        let result = require_number(number, self.core.translator()).map(|jid| {
            json!({
                "message_id": Self::fake_message_id(),
                "media_type": message.media_type().as_str(),
                "status": "sent",
                "remote_jid": jid,
                "simulated": true,
            })
        });
        self.finish(result)
    }

    async fn send_presence(&self, number: &str, presence: &str, delay_ms: u64) -> Envelope {
        if let Err(envelope) = self.simulate("send_presence").await {
            return envelope;
        }
        let result = PresenceType::parse(presence, self.core.translator()).and_then(|presence| {
            let jid = require_number(number, self.core.translator())?;
            Ok(json!({"remote_jid": jid, "presence": presence.as_str(), "delay": delay_ms}))
        });
        self.finish(result)
    }

    async fn send_archive(&self, number: &str, last_message_id: &str, archive: bool) -> Envelope {
        if let Err(envelope) = self.simulate("send_archive").await {
            return envelope;
        }
        let result = require_number(number, self.core.translator()).map(|jid| {
            json!({"remote_jid": jid, "archived": archive, "last_message_id": last_message_id})
        });
        self.finish(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockHttpClient;
    use crate::i18n::DefaultCatalog;
    use rstest::rstest;
    use std::sync::Arc;

    fn build(extra: &[(&str, &str)]) -> (TestChatProvider, Arc<MockHttpClient>) {
        let mock = Arc::new(MockHttpClient::new());
        let mut config = ProviderConfig::new()
            .with("apikey", "test-key")
            .with("instance", "sandbox")
            .with("latency_ms", 0);
        for (k, v) in extra {
            config.set(*k, *v);
        }
        let ctx = ProviderContext::new(mock.clone(), Arc::new(DefaultCatalog));
        (TestChatProvider::new(config, ctx).unwrap(), mock)
    }

    #[rstest]
    #[case("connection", "CONNECTION_ERROR")]
    #[case("authentication", "AUTHENTICATION_FAILED")]
    #[case("rate_limit", "RATE_LIMIT_EXCEEDED")]
    #[case("invalid_number", "INVALID_NUMBER")]
    #[case("media_error", "MEDIA_ERROR")]
    #[case("meteor_strike", "CONNECTION_ERROR")]
    #[tokio::test]
    async fn test_simulated_error_codes(#[case] error_type: &str, #[case] code: &str) {
        let (provider, mock) = build(&[("simulate_error", "true"), ("error_type", error_type)]);

        let env = provider
            .send_message("5511999999999", &OutgoingMessage::text("hi"))
            .await;

        assert!(!env.success);
        assert_eq!(env.error_code.as_deref(), Some(code));
        assert!(!env.error.as_deref().unwrap_or_default().is_empty());
        assert_eq!(env.to_value()["api"], "test");
        assert_eq!(mock.call_count(), 0);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_success_paths() {
        let (provider, mock) = build(&[]);

        let env = provider
            .send_message(
                "+55 11 99999-9999",
                &OutgoingMessage::media("https://cdn.test/a.mp4", "clip"),
            )
            .await;
        assert!(env.success);
        assert_eq!(env.get_str("media_type"), Some("video"));
        assert!(env.get_str("message_id").unwrap().starts_with("TEST"));
        assert_eq!(env.get_str("remote_jid"), Some("5511999999999@s.whatsapp.net"));

        let env = provider.send_presence("5511999999999", "recording", 500).await;
        assert!(env.success);
        assert_eq!(env.get_str("presence"), Some("recording"));

        let env = provider.send_archive("5511999999999", "ID1", false).await;
        assert!(env.success);
        assert_eq!(env.get("archived"), Some(&json!(false)));

        assert_eq!(provider.call_count(), 3);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_presence() {
        let (provider, _) = build(&[]);
        let env = provider.send_presence("5511999999999", "dancing", 0).await;
        assert_eq!(env.error_code.as_deref(), Some("INVALID_PRESENCE"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_latency_applies() {
        let mock = Arc::new(MockHttpClient::new());
        let ctx = ProviderContext::new(mock, Arc::new(DefaultCatalog));
        let provider = TestChatProvider::new(
            ProviderConfig::new().with("apikey", "k").with("instance", "i"),
            ctx,
        )
        .unwrap();

        let started = tokio::time::Instant::now();
        provider
            .send_message("5511999999999", &OutgoingMessage::text("hi"))
            .await;
        assert!(started.elapsed() >= Duration::from_millis(DEFAULT_LATENCY_MS));
    }

    #[test]
    fn test_requires_credentials_like_any_provider() {
        let ctx = ProviderContext::new(Arc::new(MockHttpClient::new()), Arc::new(DefaultCatalog));
        let err = TestChatProvider::new(ProviderConfig::new().with("instance", "i"), ctx).unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }
}
