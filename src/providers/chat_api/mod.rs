//! Messaging providers
//!
//! WhatsApp-style messaging APIs: text and media messages, presence
//! indicators and chat archiving.

pub mod evolution;
pub mod media;
pub mod test_provider;

pub use evolution::EvolutionProvider;
pub use media::{MediaDescriptor, MediaType, detect_media_type, get_mime_type};
pub use test_provider::{SimulatedError, TestChatProvider};

use super::Provider;
use crate::envelope::Envelope;
use crate::error::ProviderError;
use crate::i18n::Translator;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// JID domain appended to bare phone numbers
pub const JID_SUFFIX: &str = "@s.whatsapp.net";

/// Domain of group chat JIDs
pub const GROUP_DOMAIN: &str = "g.us";

#[async_trait]
pub trait ChatApiProvider: Provider {
    /// Send text, or media when `message.media_url` is set:
    /// `{message_id, media_type, status, remote_jid}` on success
    async fn send_message(&self, number: &str, message: &OutgoingMessage) -> Envelope;

    /// Show `composing`, `recording` or `paused` for `delay_ms`
    async fn send_presence(&self, number: &str, presence: &str, delay_ms: u64) -> Envelope;

    /// Archive (or unarchive) the chat whose last message is `last_message_id`
    async fn send_archive(&self, number: &str, last_message_id: &str, archive: bool)
    -> Envelope;
}

/// An outgoing message. Without `media_url` it is plain text; with one,
/// `text` becomes the caption (ignored for audio).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub media_url: Option<String>,
    pub filename: Option<String>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn media(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            text: caption.into(),
            media_url: Some(url.into()),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Media classification of the attachment (`Text` when there is none)
    pub fn media_type(&self) -> MediaType {
        detect_media_type(self.media_url.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceType {
    Composing,
    Recording,
    Paused,
}

impl PresenceType {
    pub const ALL: [PresenceType; 3] = [
        PresenceType::Composing,
        PresenceType::Recording,
        PresenceType::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceType::Composing => "composing",
            PresenceType::Recording => "recording",
            PresenceType::Paused => "paused",
        }
    }

    /// Parse, or fail with `INVALID_PRESENCE` and a translated message
    pub fn parse(value: &str, translator: &dyn Translator) -> Result<Self, ProviderError> {
        value.parse().map_err(|_| {
            let allowed = Self::ALL
                .iter()
                .map(PresenceType::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            ProviderError::invalid_input(
                "INVALID_PRESENCE",
                translator.lookup(
                    "services.chat_api.invalid_presence",
                    &[("presence", value), ("allowed", allowed.as_str())],
                ),
            )
        })
    }
}

impl FromStr for PresenceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composing" => Ok(PresenceType::Composing),
            "recording" => Ok(PresenceType::Recording),
            "paused" => Ok(PresenceType::Paused),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PresenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalise a phone number to a JID. Every non-digit is stripped from the
/// local part; an existing domain (`@g.us`, `@s.whatsapp.net`) is kept,
/// otherwise [`JID_SUFFIX`] is appended. Group ids keep their `-`
/// separator (`creator-timestamp@g.us`).
pub fn format_number(number: &str) -> String {
    let number = number.trim();
    let Some((local, domain)) = number.split_once('@') else {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        return format!("{}{}", digits, JID_SUFFIX);
    };
    let domain = domain.trim().to_ascii_lowercase();
    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_digit() || (*c == '-' && domain == GROUP_DOMAIN))
        .collect();
    format!("{}@{}", local, domain)
}

/// [`format_number`], failing with `INVALID_NUMBER` when no digits remain
pub fn require_number(number: &str, translator: &dyn Translator) -> Result<String, ProviderError> {
    let jid = format_number(number);
    if jid == JID_SUFFIX || jid.starts_with('@') {
        return Err(ProviderError::invalid_input(
            "INVALID_NUMBER",
            translator.lookup("services.chat_api.invalid_number", &[]),
        ));
    }
    Ok(jid)
}
