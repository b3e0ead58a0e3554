//! Shared provider plumbing
//!
//! [`ProviderCore`] owns what every concrete provider needs regardless of
//! vendor: its name and family, the immutable [`ProviderConfig`], the
//! extracted credential, and the HTTP/translation collaborators.

use super::ProviderContext;
use crate::config::{ProviderConfig, SecretString};
use crate::envelope::{Envelope, Family};
use crate::error::{ProviderError, Result};
use crate::http::{HttpClient, HttpResponse};
use crate::i18n::Translator;
use crate::utils::{redact_text, redact_vendor_body, truncate_str, vendor_error_message};
use serde_json::Value;

/// Credential keys checked before any vendor alias
pub const DEFAULT_CREDENTIAL_KEYS: &[&str] = &["credential_value", "api_key"];

/// Keys naming a messaging instance
const INSTANCE_KEYS: &[&str] = &["instance", "instance_name"];

/// Longest raw vendor body quoted in an error message
const MAX_ERROR_BODY: usize = 300;

pub struct ProviderCore {
    family: Family,
    name: String,
    config: ProviderConfig,
    credential: SecretString,
    instance: Option<String>,
    ctx: ProviderContext,
}

impl ProviderCore {
    /// Store `config` and extract the credential: the first non-empty value
    /// among [`DEFAULT_CREDENTIAL_KEYS`] followed by `aliases`.
    ///
    /// Providers call [`validate_config`](Self::validate_config) right
    /// after this and refuse to construct on failure.
    pub fn new(
        family: Family,
        name: impl Into<String>,
        config: ProviderConfig,
        aliases: &[&str],
        ctx: ProviderContext,
    ) -> Self {
        let keys: Vec<&str> = DEFAULT_CREDENTIAL_KEYS
            .iter()
            .chain(aliases.iter())
            .copied()
            .collect();
        let credential = config.first_secret(&keys).unwrap_or_default();
        let instance = match family {
            Family::ChatApi => config.first_str(INSTANCE_KEYS),
            Family::Ai | Family::Ads => None,
        };
        Self {
            family,
            name: name.into(),
            config,
            credential,
            instance,
            ctx,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn credential(&self) -> &SecretString {
        &self.credential
    }

    /// Messaging instance identifier (empty outside the messaging family)
    pub fn instance(&self) -> &str {
        self.instance.as_deref().unwrap_or_default()
    }

    pub fn http(&self) -> &dyn HttpClient {
        self.ctx.http.as_ref()
    }

    pub fn translator(&self) -> &dyn Translator {
        self.ctx.translator.as_ref()
    }

    /// Translate `key`; `:provider` is always available as a placeholder.
    pub fn t(&self, key: &str, placeholders: &[(&str, &str)]) -> String {
        let mut all = Vec::with_capacity(placeholders.len() + 1);
        all.push(("provider", self.name.as_str()));
        all.extend_from_slice(placeholders);
        self.translator().lookup(key, &all)
    }

    /// `base_url` from config without a trailing slash, or `default`.
    pub fn base_url(&self, default: &str) -> String {
        self.config
            .get_str("base_url")
            .unwrap_or_else(|| default.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Fail with `Configuration` when the credential (and, for messaging
    /// providers, the instance) is missing. Logged before returning.
    pub fn validate_config(&self) -> Result<()> {
        let problem = if self.credential.is_empty() {
            Some(self.t("services.provider.missing_credential", &[]))
        } else if self.family == Family::ChatApi && self.instance().is_empty() {
            Some(self.t("services.provider.missing_instance", &[]))
        } else {
            None
        };

        match problem {
            Some(message) => {
                tracing::error!(
                    family = %self.family,
                    provider = %self.name,
                    "Provider configuration invalid: {}",
                    message
                );
                Err(ProviderError::configuration(&self.name, message))
            }
            None => Ok(()),
        }
    }

    pub fn success(&self, data: Value) -> Envelope {
        Envelope::ok(self.family, &self.name, data)
    }

    pub fn error(&self, message: impl Into<String>, code: Option<&str>) -> Envelope {
        let message = message.into();
        tracing::warn!(
            family = %self.family,
            provider = %self.name,
            code = code.unwrap_or("-"),
            "{}",
            message
        );
        Envelope::err(self.family, &self.name, message, code)
    }

    /// Convert an operation failure into an error envelope with a
    /// translated message and the error's machine code.
    pub fn fail(&self, err: &ProviderError) -> Envelope {
        let message = match err {
            ProviderError::Configuration { message, .. } => message.clone(),
            ProviderError::InvalidInput { message, .. } => message.clone(),
            ProviderError::ProviderNotFound { provider, family } => self.translator().lookup(
                "services.provider.not_found",
                &[("provider", provider.as_str()), ("family", family.as_str())],
            ),
            ProviderError::Unsupported { operation, .. } => {
                self.t("services.provider.not_supported", &[("operation", operation.as_str())])
            }
            ProviderError::NotImplemented { operation, .. } => {
                self.t("services.provider.not_implemented", &[("operation", operation.as_str())])
            }
            ProviderError::Transport(error) => {
                self.t("services.provider.connection_error", &[("error", error.as_str())])
            }
            ProviderError::Http { status, message } => {
                let status = status.to_string();
                match self.family {
                    Family::ChatApi if !message.is_empty() => {
                        self.t("services.chat_api.vendor_error", &[("error", message.as_str())])
                    }
                    Family::ChatApi => {
                        self.t("services.chat_api.http_error", &[("status", status.as_str())])
                    }
                    _ => self.t(
                        "services.ai.http_error",
                        &[("status", status.as_str()), ("error", message.as_str())],
                    ),
                }
            }
            ProviderError::InvalidResponse(error) => match self.family {
                Family::ChatApi => {
                    self.t("services.chat_api.unexpected_response", &[("error", error.as_str())])
                }
                _ => self.t("services.ai.invalid_response", &[("error", error.as_str())]),
            },
            ProviderError::UnexpectedResponse(error) => {
                self.t("services.chat_api.unexpected_response", &[("error", error.as_str())])
            }
        };
        self.error(message, Some(err.code()))
    }

    /// Unwrap an HTTP outcome: the response body on 2xx, otherwise `Http`
    /// (vendor message when one can be found) or `Transport` when no
    /// response arrived.
    pub fn check_http(&self, response: HttpResponse) -> Result<Value> {
        if response.success {
            return Ok(response.data.unwrap_or(Value::Null));
        }

        let raw = response.error.unwrap_or_default();
        if response.status == 0 {
            return Err(ProviderError::Transport(redact_text(&raw)));
        }

        let message = response
            .data
            .as_ref()
            .and_then(vendor_error_message)
            .unwrap_or_else(|| truncate_str(&redact_text(&raw), MAX_ERROR_BODY));
        self.log(
            "vendor returned HTTP error",
            &serde_json::json!({
                "status": response.status,
                "body": response.data.as_ref().map(redact_vendor_body),
            }),
        );
        Err(ProviderError::Http {
            status: response.status,
            message,
        })
    }

    /// Debug-level diagnostics tagged with family and provider. `data` is
    /// redacted before it is written.
    pub fn log(&self, message: &str, data: &Value) {
        tracing::debug!(
            family = %self.family,
            provider = %self.name,
            data = %redact_vendor_body(data),
            "{}",
            message
        );
    }
}

impl std::fmt::Debug for ProviderCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCore")
            .field("family", &self.family)
            .field("name", &self.name)
            .field("config", &self.config)
            .field("instance", &self.instance)
            .finish()
    }
}
