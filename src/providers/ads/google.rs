//! Google Ads provider (request contract only, no vendor calls yet)

use super::{AdProvider, MetricsRequest};
use crate::config::ProviderConfig;
use crate::envelope::{Envelope, Family};
use crate::error::{ProviderError, Result};
use crate::providers::{Provider, ProviderContext, ProviderCore};
use async_trait::async_trait;

pub const NAME: &str = "google";

#[derive(Debug)]
pub struct GoogleAdsProvider {
    core: ProviderCore,
}

impl GoogleAdsProvider {
    pub fn new(config: ProviderConfig, ctx: ProviderContext) -> Result<Self> {
        let core = ProviderCore::new(
            Family::Ads,
            NAME,
            config,
            &["developer_token", "google_ads_developer_token"],
            ctx,
        );
        core.validate_config()?;
        Ok(Self { core })
    }

    /// Customer id with the dashes Google displays removed
    pub fn customer_id(&self) -> Option<String> {
        self.core
            .config()
            .get_str("customer_id")
            .map(|id| id.chars().filter(char::is_ascii_digit).collect())
    }
}

impl Provider for GoogleAdsProvider {
    fn core(&self) -> &ProviderCore {
        &self.core
    }
}

#[async_trait]
impl AdProvider for GoogleAdsProvider {
    async fn get_asset_metrics(
        &self,
        asset_id: &str,
        asset_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Envelope {
        if let Err(e) = MetricsRequest::validate(&self.core, asset_type, start_date, end_date) {
            return self.core.fail(&e);
        }
        tracing::debug!(provider = NAME, asset_id, "Google Ads metrics requested");
        self.core
            .fail(&ProviderError::not_implemented(NAME, "get_asset_metrics"))
    }
}
