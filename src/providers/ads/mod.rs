//! Ad-metrics providers
//!
//! Vendors report spend and delivery counters for a campaign, ad set or ad
//! over a date range. Ratios are always derived from summed counters, never
//! averaged.

pub mod google;
pub mod meta;

pub use google::GoogleAdsProvider;
pub use meta::MetaAdsProvider;

use super::{Provider, ProviderCore};
use crate::envelope::Envelope;
use crate::error::{ProviderError, Result};
use crate::i18n::Translator;
use crate::utils::round2;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::{self, Write};

/// Output format used when the caller does not ask for another
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[async_trait]
pub trait AdProvider: Provider {
    /// Metrics for one asset: `{asset_id, asset_type, start_date, end_date,
    /// metrics}` on success
    async fn get_asset_metrics(
        &self,
        asset_id: &str,
        asset_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Envelope;

    /// Fetch every asset concurrently through
    /// [`get_asset_metrics`](Self::get_asset_metrics) and aggregate with
    /// [`sum_metrics`]. The first failing asset (in input order) fails the
    /// whole call.
    async fn get_multiple_assets_metrics(
        &self,
        asset_ids: &[String],
        asset_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Envelope {
        let core = self.core();
        if asset_ids.is_empty() {
            return core.error(core.t("services.ads.no_assets", &[]), Some("NO_ASSETS"));
        }
        if let Err(e) = validate_asset_type(asset_type, core.translator()) {
            return core.fail(&e);
        }

        let envelopes = join_all(
            asset_ids
                .iter()
                .map(|asset_id| self.get_asset_metrics(asset_id, asset_type, start_date, end_date)),
        )
        .await;

        let mut assets = Vec::with_capacity(asset_ids.len());
        let mut collected = Vec::with_capacity(asset_ids.len());
        for (asset_id, envelope) in asset_ids.iter().zip(envelopes) {
            if !envelope.success {
                return envelope;
            }
            let metrics = MetricsTotals::from_value(envelope.get("metrics").unwrap_or(&Value::Null));
            assets.push(json!({"asset_id": asset_id, "metrics": metrics}));
            collected.push(metrics);
        }

        core.success(json!({
            "asset_type": asset_type,
            "start_date": start_date,
            "end_date": end_date,
            "totals": sum_metrics(&collected),
            "assets": assets,
            "asset_count": asset_ids.len(),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Campaign,
    Adset,
    Ad,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [AssetType::Campaign, AssetType::Adset, AssetType::Ad];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Campaign => "campaign",
            AssetType::Adset => "adset",
            AssetType::Ad => "ad",
        }
    }

    fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "campaign" => Some(AssetType::Campaign),
            "adset" => Some(AssetType::Adset),
            "ad" => Some(AssetType::Ad),
            _ => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `value`, or fail with `INVALID_ASSET_TYPE`
pub fn validate_asset_type(
    value: &str,
    translator: &dyn Translator,
) -> std::result::Result<AssetType, ProviderError> {
    AssetType::from_name(value).ok_or_else(|| {
        let allowed = AssetType::ALL
            .iter()
            .map(AssetType::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        ProviderError::invalid_input(
            "INVALID_ASSET_TYPE",
            translator.lookup(
                "services.ads.invalid_asset_type",
                &[("type", value), ("allowed", allowed.as_str())],
            ),
        )
    })
}

/// Reformat `date` (`YYYY-MM-DD`, RFC 3339 or unix seconds) with the
/// strftime pattern `fmt`. `None` when either cannot be understood.
pub fn format_date(date: &str, fmt: &str) -> Option<String> {
    let date = date.trim();
    let mut out = String::new();

    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        write!(out, "{}", day.format(fmt)).ok()?;
    } else if let Ok(instant) = DateTime::parse_from_rfc3339(date) {
        write!(out, "{}", instant.format(fmt)).ok()?;
    } else {
        let instant = DateTime::from_timestamp(date.parse::<i64>().ok()?, 0)?;
        write!(out, "{}", instant.format(fmt)).ok()?;
    }
    Some(out)
}

/// [`format_date`] with the default pattern, failing with `INVALID_DATE`
pub fn require_date(date: &str, translator: &dyn Translator) -> std::result::Result<String, ProviderError> {
    format_date(date, DEFAULT_DATE_FORMAT).ok_or_else(|| {
        ProviderError::invalid_input(
            "INVALID_DATE",
            translator.lookup("services.ads.invalid_date", &[("date", date)]),
        )
    })
}

/// Validated request parameters shared by every ad vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsRequest {
    pub asset_type: AssetType,
    pub start_date: String,
    pub end_date: String,
}

impl MetricsRequest {
    /// Re-validate config, then check asset type and both dates.
    pub fn validate(
        core: &ProviderCore,
        asset_type: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Self> {
        core.validate_config()?;
        let asset_type = validate_asset_type(asset_type, core.translator())?;
        Ok(Self {
            asset_type,
            start_date: require_date(start_date, core.translator())?,
            end_date: require_date(end_date, core.translator())?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsTotals {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub reach: u64,
    pub conversion_value: f64,
    pub cpm: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub conversion_rate: f64,
}

impl MetricsTotals {
    /// Read counters from a vendor object. Missing fields are zero and
    /// numeric strings are accepted. Ratios are recomputed.
    pub fn from_value(value: &Value) -> Self {
        let number = |key: &str| -> f64 {
            match value.get(key) {
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
                _ => 0.0,
            }
        };
        let count = |key: &str| number(key).max(0.0).round() as u64;

        let mut totals = Self {
            spend: number("spend"),
            impressions: count("impressions"),
            clicks: count("clicks"),
            conversions: count("conversions"),
            reach: count("reach"),
            conversion_value: number("conversion_value"),
            ..Self::default()
        };
        totals.recompute_ratios();
        totals
    }

    fn recompute_ratios(&mut self) {
        let ratio = |num: f64, den: u64, scale: f64| {
            if den == 0 {
                0.0
            } else {
                round2(num / den as f64 * scale)
            }
        };
        self.cpm = ratio(self.spend, self.impressions, 1000.0);
        self.cpc = ratio(self.spend, self.clicks, 1.0);
        self.ctr = ratio(self.clicks as f64, self.impressions, 100.0);
        self.conversion_rate = ratio(self.conversions as f64, self.clicks, 100.0);
    }
}

/// Element-wise counter sum (saturating), then ratios derived from the totals.
pub fn sum_metrics(items: &[MetricsTotals]) -> MetricsTotals {
    let mut totals = items.iter().fold(MetricsTotals::default(), |mut acc, m| {
        acc.spend += m.spend;
        acc.impressions = acc.impressions.saturating_add(m.impressions);
        acc.clicks = acc.clicks.saturating_add(m.clicks);
        acc.conversions = acc.conversions.saturating_add(m.conversions);
        acc.reach = acc.reach.saturating_add(m.reach);
        acc.conversion_value += m.conversion_value;
        acc
    });
    totals.spend = round2(totals.spend);
    totals.conversion_value = round2(totals.conversion_value);
    totals.recompute_ratios();
    totals
}
