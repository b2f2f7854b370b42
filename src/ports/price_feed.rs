//! Price feed port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Source of the spot USD/BTC rate.
///
/// Called without caching; `PriceOracle` owns the cache.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current US dollars per bitcoin.
    ///
    /// # Errors
    ///
    /// `PriceFeedError` when the upstream is unreachable or returns garbage.
    async fn usd_per_btc(&self) -> Result<f64, DomainError>;
}
