//! Evolution API provider
//!
//! Self-hosted WhatsApp gateway. Every call is a JSON POST under
//! `{base_url}/<group>/<action>/{instance}` authenticated with an `apikey`
//! header. A send is only successful when the response carries `key.id`.

use super::media::{MediaDescriptor, MediaType};
use super::{ChatApiProvider, OutgoingMessage, PresenceType, require_number};
use crate::config::ProviderConfig;
use crate::envelope::{Envelope, Family};
use crate::error::{ProviderError, Result};
use crate::http::{RequestBody, RequestOptions};
use crate::providers::{Provider, ProviderContext, ProviderCore};
use async_trait::async_trait;
use serde_json::{Value, json};

pub const NAME: &str = "evolution";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug)]
pub struct EvolutionProvider {
    core: ProviderCore,
    base_url: String,
}

impl EvolutionProvider {
    /// Requires an API key (`apikey`, `evolution_api_key` or `token` besides
    /// the shared keys) and an instance name.
    pub fn new(config: ProviderConfig, ctx: ProviderContext) -> Result<Self> {
        let core = ProviderCore::new(
            Family::ChatApi,
            NAME,
            config,
            &["apikey", "evolution_api_key", "token"],
            ctx,
        );
        core.validate_config()?;
        let base_url = core.base_url(DEFAULT_BASE_URL);
        tracing::debug!(
            "Evolution API provider ready at {} (instance {})",
            base_url,
            core.instance()
        );
        Ok(Self { core, base_url })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            action,
            urlencoding::encode(self.core.instance())
        )
    }

    async fn post(&self, action: &str, payload: Value) -> Result<Value> {
        self.core.log(action, &payload);
        let options = RequestOptions::new().header("apikey", self.core.credential().expose_secret());
        let response = self
            .core
            .http()
            .post(&self.endpoint(action), RequestBody::Json(payload), options)
            .await;
        self.core.check_http(response)
    }

    async fn try_send_message(&self, number: &str, message: &OutgoingMessage) -> Result<Value> {
        self.core.validate_config()?;
        let jid = require_number(number, self.core.translator())?;
        let media_type = message.media_type();
        let media_url = message.media_url.as_deref().unwrap_or_default();

        let (action, payload) = match media_type {
            MediaType::Text => (
                "message/sendText",
                json!({"number": jid, "text": message.text}),
            ),
            MediaType::Audio => {
                let media = MediaDescriptor::from_url(
                    media_url,
                    message.filename.as_deref(),
                    chrono::Utc::now().timestamp(),
                );
                (
                    "message/sendWhatsAppAudio",
                    json!({
                        "number": jid,
                        "audio": media_url,
                        "mediatype": "audio",
                        "filename": media.filename,
                        "mimetype": media.mime_type,
                        "encoding": true,
                    }),
                )
            }
            MediaType::Image | MediaType::Video | MediaType::Document => {
                let media = MediaDescriptor::from_url(
                    media_url,
                    message.filename.as_deref(),
                    chrono::Utc::now().timestamp(),
                );
                (
                    "message/sendMedia",
                    json!({
                        "number": jid,
                        "mediatype": media_type.as_str(),
                        "mimetype": media.mime_type,
                        "media": media_url,
                        "filename": media.filename,
                        "caption": message.text,
                        // older gateway builds read the caption from `text`
                        "text": message.text,
                    }),
                )
            }
        };

        let data = self.post(action, payload).await?;
        let message_id = data["key"]["id"].as_str().ok_or_else(|| {
            ProviderError::UnexpectedResponse(format!("{} response without key.id", action))
        })?;

        Ok(json!({
            "message_id": message_id,
            "media_type": media_type.as_str(),
            "status": data["status"].as_str().unwrap_or("sent"),
            "remote_jid": data["key"]["remoteJid"].as_str().unwrap_or(jid.as_str()),
        }))
    }

    async fn try_send_presence(&self, number: &str, presence: &str, delay_ms: u64) -> Result<Value> {
        self.core.validate_config()?;
        let presence = PresenceType::parse(presence, self.core.translator())?;
        let jid = require_number(number, self.core.translator())?;

        self.post(
            "chat/sendPresence",
            json!({"number": jid, "presence": presence.as_str(), "delay": delay_ms}),
        )
        .await?;

        Ok(json!({"remote_jid": jid, "presence": presence.as_str(), "delay": delay_ms}))
    }

    async fn try_send_archive(
        &self,
        number: &str,
        last_message_id: &str,
        archive: bool,
    ) -> Result<Value> {
        self.core.validate_config()?;
        let jid = require_number(number, self.core.translator())?;

        self.post(
            "chat/archiveChat",
            json!({
                "lastMessage": {
                    "key": {"remoteJid": jid, "fromMe": false, "id": last_message_id}
                },
                "archive": archive,
                "chat": jid,
            }),
        )
        .await?;

        Ok(json!({"remote_jid": jid, "archived": archive}))
    }
}

impl Provider for EvolutionProvider {
    fn core(&self) -> &ProviderCore {
        &self.core
    }
}

#[async_trait]
impl ChatApiProvider for EvolutionProvider {
    async fn send_message(&self, number: &str, message: &OutgoingMessage) -> Envelope {
        match self.try_send_message(number, message).await {
            Ok(data) => self.core.success(data),
            Err(e) => self.core.fail(&e),
        }
    }

    async fn send_presence(&self, number: &str, presence: &str, delay_ms: u64) -> Envelope {
        match self.try_send_presence(number, presence, delay_ms).await {
            Ok(data) => self.core.success(data),
            Err(e) => self.core.fail(&e),
        }
    }

    async fn send_archive(&self, number: &str, last_message_id: &str, archive: bool) -> Envelope {
        match self.try_send_archive(number, last_message_id, archive).await {
            Ok(data) => self.core.success(data),
            Err(e) => self.core.fail(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use crate::http::mock::MockHttpClient;
    use crate::i18n::DefaultCatalog;
    use std::sync::Arc;

    fn config() -> ProviderConfig {
        ProviderConfig::new()
            .with("base_url", "https://evo.test/")
            .with("apikey", "evo-key")
            .with("instance", "main line")
    }

    fn provider(mock: Arc<MockHttpClient>) -> EvolutionProvider {
        EvolutionProvider::new(config(), ProviderContext::new(mock, Arc::new(DefaultCatalog)))
            .unwrap()
    }

    fn ack(id: &str) -> Value {
        json!({
            "key": {"remoteJid": "5511999999999@s.whatsapp.net", "fromMe": true, "id": id},
            "status": "PENDING"
        })
    }

    #[test]
    fn test_missing_instance_fails_construction() {
        let mock = Arc::new(MockHttpClient::new());
        let err = EvolutionProvider::new(
            ProviderConfig::new().with("apikey", "evo-key"),
            ProviderContext::new(mock.clone(), Arc::new(DefaultCatalog)),
        )
        .unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_send_text() {
        let mock = Arc::new(MockHttpClient::new().respond_json(ack("MSG1")));
        let env = provider(mock.clone())
            .send_message("+55 11 99999-9999", &OutgoingMessage::text("hello"))
            .await;

        assert!(env.success, "{:?}", env.error);
        assert_eq!(env.get_str("message_id"), Some("MSG1"));
        assert_eq!(env.get_str("media_type"), Some("text"));
        assert_eq!(env.get_str("status"), Some("PENDING"));
        assert_eq!(env.to_value()["api"], "evolution");

        let request = mock.last();
        assert_eq!(request.url, "https://evo.test/message/sendText/main%20line");
        assert_eq!(request.header("apikey"), Some("evo-key"));
        assert_eq!(
            request.json(),
            &json!({"number": "5511999999999@s.whatsapp.net", "text": "hello"})
        );
    }

    #[tokio::test]
    async fn test_send_image_mirrors_caption() {
        let mock = Arc::new(MockHttpClient::new().respond_json(ack("MSG2")));
        provider(mock.clone())
            .send_message(
                "5511999999999",
                &OutgoingMessage::media("https://cdn.test/p/cat.png?s=1", "my cat"),
            )
            .await;

        let request = mock.last();
        assert_eq!(request.url, "https://evo.test/message/sendMedia/main%20line");
        assert_eq!(
            request.json(),
            &json!({
                "number": "5511999999999@s.whatsapp.net",
                "mediatype": "image",
                "mimetype": "image/png",
                "media": "https://cdn.test/p/cat.png?s=1",
                "filename": "cat.png",
                "caption": "my cat",
                "text": "my cat"
            })
        );
    }

    #[tokio::test]
    async fn test_send_audio_has_no_caption() {
        let mock = Arc::new(MockHttpClient::new().respond_json(ack("MSG3")));
        let env = provider(mock.clone())
            .send_message(
                "5511999999999",
                &OutgoingMessage::media("https://cdn.test/v/note.ogg", "ignored")
                    .with_filename("voice.ogg"),
            )
            .await;
        assert_eq!(env.get_str("media_type"), Some("audio"));

        let request = mock.last();
        assert_eq!(
            request.url,
            "https://evo.test/message/sendWhatsAppAudio/main%20line"
        );
        let body = request.json();
        assert_eq!(body["audio"], "https://cdn.test/v/note.ogg");
        assert_eq!(body["mediatype"], "audio");
        assert_eq!(body["mimetype"], "audio/ogg");
        assert_eq!(body["encoding"], true);
        assert!(body.get("caption").is_none());
        let filename = body["filename"].as_str().unwrap();
        assert!(filename.starts_with("voice-"));
        assert!(filename.ends_with(".ogg"));
    }

    #[tokio::test]
    async fn test_http_200_without_key_is_unexpected() {
        let mock = Arc::new(MockHttpClient::new().respond_json(json!({"status": "PENDING"})));
        let env = provider(mock)
            .send_message("5511999999999", &OutgoingMessage::text("hi"))
            .await;
        assert!(!env.success);
        assert_eq!(env.error_code.as_deref(), Some("UNEXPECTED_RESPONSE"));
    }

    #[tokio::test]
    async fn test_vendor_error_message_surfaces() {
        let mock = Arc::new(MockHttpClient::new().respond(HttpResponse::failed(
            400,
            Some(json!({"status": 400, "response": {"message": [{"exists": false, "number": "123"}]}})),
            "Bad Request",
        )));
        let env = provider(mock)
            .send_message("123", &OutgoingMessage::text("hi"))
            .await;
        assert!(!env.success);
        assert_eq!(env.error_code.as_deref(), Some("HTTP_ERROR"));
        assert!(env.error.as_deref().unwrap().starts_with("Messaging API error:"));
    }

    #[tokio::test]
    async fn test_generic_http_error() {
        let mock = Arc::new(MockHttpClient::new().respond(HttpResponse::failed(502, None, "")));
        let env = provider(mock)
            .send_message("123", &OutgoingMessage::text("hi"))
            .await;
        assert_eq!(env.error.as_deref(), Some("Messaging API error (HTTP 502)"));
    }

    #[tokio::test]
    async fn test_invalid_presence_is_local() {
        let mock = Arc::new(MockHttpClient::new());
        let env = provider(mock.clone())
            .send_presence("5511999999999", "typing", 1200)
            .await;
        assert!(!env.success);
        assert_eq!(env.error_code.as_deref(), Some("INVALID_PRESENCE"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_send_presence_payload() {
        let mock = Arc::new(MockHttpClient::new().respond_json(json!({"presence": "composing"})));
        let env = provider(mock.clone())
            .send_presence("5511999999999", "composing", 1200)
            .await;
        assert!(env.success);

        let request = mock.last();
        assert_eq!(request.url, "https://evo.test/chat/sendPresence/main%20line");
        assert_eq!(
            request.json(),
            &json!({"number": "5511999999999@s.whatsapp.net", "presence": "composing", "delay": 1200})
        );
    }

    #[tokio::test]
    async fn test_send_archive_payload() {
        let mock = Arc::new(MockHttpClient::new().respond_json(json!({"chatId": "x", "archived": true})));
        let env = provider(mock.clone())
            .send_archive("5511999999999", "LAST1", true)
            .await;
        assert!(env.success);
        assert_eq!(env.get("archived"), Some(&json!(true)));

        let request = mock.last();
        assert_eq!(request.url, "https://evo.test/chat/archiveChat/main%20line");
        assert_eq!(
            request.json(),
            &json!({
                "lastMessage": {
                    "key": {
                        "remoteJid": "5511999999999@s.whatsapp.net",
                        "fromMe": false,
                        "id": "LAST1"
                    }
                },
                "archive": true,
                "chat": "5511999999999@s.whatsapp.net"
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_number_is_local() {
        let mock = Arc::new(MockHttpClient::new());
        let env = provider(mock.clone())
            .send_message("not a number", &OutgoingMessage::text("hi"))
            .await;
        assert_eq!(env.error_code.as_deref(), Some("INVALID_NUMBER"));
        assert_eq!(mock.call_count(), 0);
    }
}
