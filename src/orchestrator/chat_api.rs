//! Messaging orchestrator: `evolution` (default) and the synthetic `test`.

use super::Orchestrator;
use crate::config::{Config, CredentialSource};
use crate::envelope::{Envelope, Family};
use crate::error::Result;
use crate::providers::ProviderContext;
use crate::providers::chat_api::{
    ChatApiProvider, EvolutionProvider, OutgoingMessage, TestChatProvider, evolution,
    test_provider,
};
use std::sync::Arc;

pub type ChatApiOrchestrator = Orchestrator<dyn ChatApiProvider>;

impl Orchestrator<dyn ChatApiProvider> {
    pub fn with_builtin_providers(
        credentials: Arc<dyn CredentialSource>,
        ctx: ProviderContext,
    ) -> Self {
        let mut orch = Self::new(Family::ChatApi, evolution::NAME, credentials, ctx);
        orch.register(evolution::NAME, |config, ctx| {
            Ok(Arc::new(EvolutionProvider::new(config, ctx)?) as Arc<dyn ChatApiProvider>)
        });
        orch.register(test_provider::NAME, |config, ctx| {
            Ok(Arc::new(TestChatProvider::new(config, ctx)?) as Arc<dyn ChatApiProvider>)
        });
        orch
    }

    pub fn from_config(config: &Config, ctx: ProviderContext) -> Result<Self> {
        let orch = Self::with_builtin_providers(Arc::new(config.clone()), ctx);
        if let Some(default) = &config.chat_api.default {
            orch.set_default(default)?;
        }
        Ok(orch)
    }

    pub async fn send_message(
        &self,
        provider: Option<&str>,
        number: &str,
        message: &OutgoingMessage,
    ) -> Envelope {
        match self.provider(provider) {
            Ok(p) => p.send_message(number, message).await,
            Err(e) => self.resolution_failure(provider, &e),
        }
    }

    pub async fn send_presence(
        &self,
        provider: Option<&str>,
        number: &str,
        presence: &str,
        delay_ms: u64,
    ) -> Envelope {
        match self.provider(provider) {
            Ok(p) => p.send_presence(number, presence, delay_ms).await,
            Err(e) => self.resolution_failure(provider, &e),
        }
    }

    pub async fn send_archive(
        &self,
        provider: Option<&str>,
        number: &str,
        last_message_id: &str,
        archive: bool,
    ) -> Envelope {
        match self.provider(provider) {
            Ok(p) => p.send_archive(number, last_message_id, archive).await,
            Err(e) => self.resolution_failure(provider, &e),
        }
    }
}
