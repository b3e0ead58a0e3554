//! Ads orchestrator: `meta` (default) and `google`.

use super::Orchestrator;
use crate::config::{Config, CredentialSource};
use crate::envelope::{Envelope, Family};
use crate::error::Result;
use crate::providers::ProviderContext;
use crate::providers::ads::{AdProvider, GoogleAdsProvider, MetaAdsProvider, google, meta};
use std::sync::Arc;

pub type AdsOrchestrator = Orchestrator<dyn AdProvider>;

impl Orchestrator<dyn AdProvider> {
    pub fn with_builtin_providers(
        credentials: Arc<dyn CredentialSource>,
        ctx: ProviderContext,
    ) -> Self {
        let mut orch = Self::new(Family::Ads, meta::NAME, credentials, ctx);
        orch.register(meta::NAME, |config, ctx| {
            Ok(Arc::new(MetaAdsProvider::new(config, ctx)?) as Arc<dyn AdProvider>)
        });
        orch.register(google::NAME, |config, ctx| {
            Ok(Arc::new(GoogleAdsProvider::new(config, ctx)?) as Arc<dyn AdProvider>)
        });
        orch
    }

    pub fn from_config(config: &Config, ctx: ProviderContext) -> Result<Self> {
        let orch = Self::with_builtin_providers(Arc::new(config.clone()), ctx);
        if let Some(default) = &config.ads.default {
            orch.set_default(default)?;
        }
        Ok(orch)
    }

    pub async fn asset_metrics(
        &self,
        provider: Option<&str>,
        asset_id: &str,
        asset_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Envelope {
        match self.provider(provider) {
            Ok(p) => {
                p.get_asset_metrics(asset_id, asset_type, start_date, end_date)
                    .await
            }
            Err(e) => self.resolution_failure(provider, &e),
        }
    }

    pub async fn multiple_assets_metrics(
        &self,
        provider: Option<&str>,
        asset_ids: &[String],
        asset_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Envelope {
        match self.provider(provider) {
            Ok(p) => {
                p.get_multiple_assets_metrics(asset_ids, asset_type, start_date, end_date)
                    .await
            }
            Err(e) => self.resolution_failure(provider, &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, StaticCredentials};
    use crate::http::mock::MockHttpClient;
    use crate::i18n::DefaultCatalog;

    #[tokio::test]
    async fn test_placeholders_through_orchestrator() {
        let credentials = StaticCredentials::new()
            .with(Family::Ads, "meta", ProviderConfig::new().with("access_token", "EAAB"))
            .with(Family::Ads, "google", ProviderConfig::new().with("developer_token", "dev"));
        let orch = AdsOrchestrator::with_builtin_providers(
            Arc::new(credentials),
            ProviderContext::new(Arc::new(MockHttpClient::new()), Arc::new(DefaultCatalog)),
        );

        let env = orch
            .asset_metrics(None, "1", "campaign", "2024-01-01", "2024-01-31")
            .await;
        assert_eq!(env.error_code.as_deref(), Some("NOT_IMPLEMENTED"));
        assert_eq!(env.to_value()["provider"], "meta");

        let env = orch
            .multiple_assets_metrics(Some("google"), &[], "ad", "2024-01-01", "2024-01-31")
            .await;
        assert_eq!(env.error_code.as_deref(), Some("NO_ASSETS"));

        let env = orch
            .asset_metrics(Some("tiktok"), "1", "ad", "2024-01-01", "2024-01-31")
            .await;
        assert_eq!(env.error_code.as_deref(), Some("PROVIDER_NOT_FOUND"));
    }
}
