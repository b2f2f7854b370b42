//! Pricing configuration

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;
use crate::adapters::price::DEFAULT_PRICE_FEED_URL;
use crate::domain::pricing::TierPricing;

/// Tier prices and the USD/BTC price feed
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Premium monthly price in US cents
    #[serde(default = "default_premium_monthly_cents")]
    pub premium_monthly_cents: u64,

    /// Premium+ monthly price in US cents
    #[serde(default = "default_premium_plus_monthly_cents")]
    pub premium_plus_monthly_cents: u64,

    /// Spot price endpoint returning `{"data":{"amount":"..."}}`
    #[serde(default = "default_price_feed_url")]
    pub price_feed_url: String,

    /// Price feed request timeout in seconds
    #[serde(default = "default_price_feed_timeout")]
    pub price_feed_timeout_secs: u64,
}

impl PricingConfig {
    pub fn tier_pricing(&self) -> TierPricing {
        TierPricing::new(self.premium_monthly_cents, self.premium_plus_monthly_cents)
    }

    pub fn price_feed_timeout(&self) -> Duration {
        Duration::from_secs(self.price_feed_timeout_secs)
    }

    /// Validate pricing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.premium_monthly_cents == 0 {
            return Err(ValidationError::InvalidPrice("premium_monthly_cents"));
        }
        if self.premium_plus_monthly_cents == 0 {
            return Err(ValidationError::InvalidPrice("premium_plus_monthly_cents"));
        }
        match Url::parse(&self.price_feed_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ValidationError::InvalidPriceFeedUrl),
        }
        if self.price_feed_timeout_secs == 0 || self.price_feed_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("price_feed_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            premium_monthly_cents: default_premium_monthly_cents(),
            premium_plus_monthly_cents: default_premium_plus_monthly_cents(),
            price_feed_url: default_price_feed_url(),
            price_feed_timeout_secs: default_price_feed_timeout(),
        }
    }
}

fn default_premium_monthly_cents() -> u64 {
    1000
}

fn default_premium_plus_monthly_cents() -> u64 {
    2000
}

fn default_price_feed_url() -> String {
    DEFAULT_PRICE_FEED_URL.to_string()
}

fn default_price_feed_timeout() -> u64 {
    10
}
