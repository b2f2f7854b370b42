//! HTTP spot price feed.
//!
//! Reads a Coinbase-style spot response:
//!
//! ```json
//! {"data": {"base": "BTC", "currency": "USD", "amount": "97123.45"}}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::PriceFeed;

/// Default spot endpoint.
pub const DEFAULT_PRICE_FEED_URL: &str = "https://api.coinbase.com/v2/prices/BTC-USD/spot";

/// Configuration for the HTTP price feed.
#[derive(Debug, Clone)]
pub struct HttpPriceFeedConfig {
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for HttpPriceFeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PRICE_FEED_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpPriceFeedConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: SpotData,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    amount: String,
}

/// Price feed backed by an HTTP spot endpoint.
pub struct HttpPriceFeed {
    config: HttpPriceFeedConfig,
    client: Client,
}

impl HttpPriceFeed {
    pub fn new(config: HttpPriceFeedConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| price_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

fn price_error(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::PriceFeedError, message)
}

/// Extracts the USD rate from a spot response body.
pub(crate) fn parse_spot_response(body: &str) -> Result<f64, DomainError> {
    let response: SpotResponse = serde_json::from_str(body)
        .map_err(|e| price_error(format!("Malformed price response: {}", e)))?;

    let rate: f64 = response
        .data
        .amount
        .trim()
        .parse()
        .map_err(|_| price_error(format!("Non-numeric price: {}", response.data.amount)))?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(price_error(format!("Implausible price: {}", rate)));
    }
    Ok(rate)
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn usd_per_btc(&self) -> Result<f64, DomainError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    price_error(format!(
                        "Price request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    price_error(format!("Price request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(price_error(format!("Price feed returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| price_error(format!("Failed to read price response: {}", e)))?;

        parse_spot_response(&body)
    }
}
