//! Provider Hub - uniform access to external AI, messaging and ad-metrics vendors
//!
//! Every vendor call, whatever the family, comes back as one [`Envelope`]:
//! a flat `success` / error object tagged with the provider that produced
//! it. Callers branch on `success` and never see vendor payload shapes or
//! transport errors directly.
//!
//! ## Families
//!
//! - **AI:** chat completion, image analysis and audio transcription
//!   (`openai`, `deepseek`)
//! - **Messaging:** text/media messages, presence and chat archiving over
//!   the Evolution API (`evolution`), plus an offline `test` provider
//! - **Ads:** per-asset and aggregated campaign metrics (`meta`, `google`;
//!   request contract only for now)
//!
//! ## Quick Start
//!
//! ```no_run
//! use provider_hub::{AiOrchestrator, ChatOptions, Config, ProviderContext};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let _guard = provider_hub::logging::init(&config.logging)?;
//!
//! let ai = AiOrchestrator::from_config(&config, ProviderContext::default())?;
//! let reply = ai.chat(None, "Summarise today's orders", &ChatOptions::new()).await;
//! if reply.success {
//!     println!("{}", reply.get_str("response").unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod i18n;
pub mod logging;
pub mod orchestrator;
pub mod providers;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, CredentialSource, ProviderConfig, SecretString, StaticCredentials};
pub use envelope::{Envelope, Family};
pub use error::{ProviderError, Result};
pub use http::{HttpClient, ReqwestHttpClient};
pub use i18n::{DefaultCatalog, Translator};
pub use orchestrator::Orchestrator;
pub use orchestrator::ads::AdsOrchestrator;
pub use orchestrator::ai::AiOrchestrator;
pub use orchestrator::chat_api::ChatApiOrchestrator;
pub use providers::ads::AdProvider;
pub use providers::ai::{AiProvider, ChatOptions, Message, Prompt};
pub use providers::chat_api::{ChatApiProvider, OutgoingMessage};
pub use providers::{Provider, ProviderContext};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
