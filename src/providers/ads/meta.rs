//! Meta (Facebook/Instagram) Ads provider
//!
//! Reserves the `meta` name and enforces the request contract. Fetching
//! insights from the Marketing API is not wired up yet, so every valid
//! request ends in `NOT_IMPLEMENTED`.

use super::{AdProvider, MetricsRequest};
use crate::config::ProviderConfig;
use crate::envelope::{Envelope, Family};
use crate::error::{ProviderError, Result};
use crate::providers::{Provider, ProviderContext, ProviderCore};
use async_trait::async_trait;

pub const NAME: &str = "meta";

#[derive(Debug)]
pub struct MetaAdsProvider {
    core: ProviderCore,
}

impl MetaAdsProvider {
    pub fn new(config: ProviderConfig, ctx: ProviderContext) -> Result<Self> {
        let core = ProviderCore::new(
            Family::Ads,
            NAME,
            config,
            &["access_token", "meta_access_token"],
            ctx,
        );
        core.validate_config()?;
        Ok(Self { core })
    }

    /// Ad account the insights query runs against
    pub fn account_id(&self) -> Option<String> {
        self.core.config().first_str(&["ad_account_id", "account_id"])
    }
}

impl Provider for MetaAdsProvider {
    fn core(&self) -> &ProviderCore {
        &self.core
    }
}

#[async_trait]
impl AdProvider for MetaAdsProvider {
    async fn get_asset_metrics(
        &self,
        asset_id: &str,
        asset_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Envelope {
        let request = match MetricsRequest::validate(&self.core, asset_type, start_date, end_date) {
            Ok(request) => request,
            Err(e) => return self.core.fail(&e),
        };
        self.core.log(
            "get_asset_metrics",
            &serde_json::json!({
                "asset_id": asset_id,
                "asset_type": request.asset_type.as_str(),
                "start_date": request.start_date,
                "end_date": request.end_date,
            }),
        );
        self.core
            .fail(&ProviderError::not_implemented(NAME, "get_asset_metrics"))
    }
}
