//! Provider error taxonomy
//!
//! Two kinds of failure leave a provider: construction-time failures
//! (`Configuration`, `ProviderNotFound`) are returned as `Err`, everything
//! else is converted into an error [`Envelope`](crate::envelope::Envelope)
//! before it crosses the provider boundary.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Missing credential / instance identifier. Raised at construction.
    #[error("{provider}: {message}")]
    Configuration { provider: String, message: String },

    /// Unknown provider name requested from an orchestrator.
    #[error("provider '{provider}' not found in family '{family}'")]
    ProviderNotFound { provider: String, family: String },

    /// Vendor answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Vendor answered 2xx but the body lacks the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Vendor answered 2xx but did not acknowledge the operation.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Vendor lacks the requested capability.
    #[error("operation '{operation}' is not supported by {provider}")]
    Unsupported { provider: String, operation: String },

    /// Contract placeholder with no vendor integration yet.
    #[error("operation '{operation}' is not implemented by {provider}")]
    NotImplemented { provider: String, operation: String },

    /// Caller input rejected locally, before any network call.
    #[error("{message}")]
    InvalidInput { code: String, message: String },

    /// Connection / timeout / TLS failure below HTTP.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn not_found(provider: impl Into<String>, family: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            provider: provider.into(),
            family: family.into(),
        }
    }

    pub fn unsupported(provider: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            provider: provider.into(),
            operation: operation.into(),
        }
    }

    pub fn not_implemented(provider: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            provider: provider.into(),
            operation: operation.into(),
        }
    }

    pub fn invalid_input(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code carried in error envelopes.
    pub fn code(&self) -> &str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::ProviderNotFound { .. } => "PROVIDER_NOT_FOUND",
            Self::Http { .. } => "HTTP_ERROR",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::UnexpectedResponse(_) => "UNEXPECTED_RESPONSE",
            Self::Unsupported { .. } => "NOT_SUPPORTED",
            Self::NotImplemented { .. } => "NOT_IMPLEMENTED",
            Self::InvalidInput { code, .. } => code,
            Self::Transport(_) => "CONNECTION_ERROR",
        }
    }

    /// Whether this error must surface as `Err` rather than an envelope.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::ProviderNotFound { .. }
        )
    }
}
