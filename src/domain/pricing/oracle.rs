//! Cached USD/BTC rate.
//!
//! The cache slot is guarded only while reading or writing the sample. Fetches
//! happen outside the lock, so concurrent callers that both see a stale value
//! may both hit the feed; the last writer wins and both get a valid rate.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::PriceFeed;

use super::PriceError;

/// How long a fetched rate stays fresh.
pub const PRICE_TTL_MINUTES: i64 = 10;

/// Rates above this are treated as a broken feed.
pub const MAX_USD_PER_BTC: f64 = 1.0e9;

/// A fetched rate and when it was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    /// US dollars per bitcoin.
    pub rate: f64,
    pub fetched_at: Timestamp,
}

impl PriceSample {
    pub fn new(rate: f64, fetched_at: Timestamp) -> Self {
        Self { rate, fetched_at }
    }

    /// True while `now` is less than `ttl` past the fetch.
    pub fn is_fresh(&self, now: Timestamp, ttl: Duration) -> bool {
        now.is_before(&self.fetched_at.plus(ttl))
    }
}

/// USD/BTC price with a TTL cache and stale fallback.
pub struct PriceOracle {
    feed: Arc<dyn PriceFeed>,
    ttl: Duration,
    cache: RwLock<Option<PriceSample>>,
}

impl PriceOracle {
    /// Creates an oracle with the standard 10-minute TTL.
    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self::with_ttl(feed, Duration::minutes(PRICE_TTL_MINUTES))
    }

    pub fn with_ttl(feed: Arc<dyn PriceFeed>, ttl: Duration) -> Self {
        Self {
            feed,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Pre-loads the cache.
    pub async fn seed(&self, rate: f64, fetched_at: Timestamp) {
        *self.cache.write().await = Some(PriceSample::new(rate, fetched_at));
    }

    /// Current cached sample, fresh or not.
    pub async fn cached(&self) -> Option<PriceSample> {
        *self.cache.read().await
    }

    /// Returns USD per BTC.
    ///
    /// # Errors
    ///
    /// `PriceError::Unavailable` when the feed fails and nothing was ever cached.
    pub async fn get(&self) -> Result<f64, PriceError> {
        self.get_at(Timestamp::now()).await
    }

    /// Same as [`get`](Self::get) with an explicit clock.
    pub async fn get_at(&self, now: Timestamp) -> Result<f64, PriceError> {
        let cached = self.cached().await;
        if let Some(sample) = cached {
            if sample.is_fresh(now, self.ttl) {
                return Ok(sample.rate);
            }
        }

        let fetched = self
            .feed
            .usd_per_btc()
            .await
            .map_err(|e| e.to_string())
            .and_then(|rate| {
                if rate.is_finite() && rate > 0.0 && rate <= MAX_USD_PER_BTC {
                    Ok(rate)
                } else {
                    Err(format!("feed returned invalid rate {}", rate))
                }
            });

        match (fetched, cached) {
            (Ok(rate), _) => {
                *self.cache.write().await = Some(PriceSample::new(rate, now));
                tracing::debug!(rate, "BTC price refreshed");
                Ok(rate)
            }
            (Err(error), Some(stale)) => {
                tracing::warn!(
                    error = %error,
                    rate = stale.rate,
                    fetched_at = %stale.fetched_at,
                    "Price fetch failed, using stale rate"
                );
                Ok(stale.rate)
            }
            (Err(error), None) => {
                tracing::error!(error = %error, "Price fetch failed and no cached rate");
                Err(PriceError::Unavailable(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct ScriptedFeed {
        rate: f64,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl ScriptedFeed {
        fn new(rate: f64) -> Arc<Self> {
            Arc::new(Self {
                rate,
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            let feed = Self::new(0.0);
            feed.fail.store(true, Ordering::SeqCst);
            feed
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceFeed for ScriptedFeed {
        async fn usd_per_btc(&self) -> Result<f64, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(DomainError::new(
                    crate::domain::foundation::ErrorCode::PriceFeedError,
                    "feed down",
                ))
            } else {
                Ok(self.rate)
            }
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Cache
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn fresh_cache_skips_fetch() {
        let feed = ScriptedFeed::new(90_000.0);
        let oracle = PriceOracle::new(feed.clone());
        let now = Timestamp::now();
        oracle.seed(100_000.0, now).await;

        let rate = oracle.get_at(now.plus(Duration::minutes(9))).await.unwrap();

        assert_eq!(rate, 100_000.0);
        assert_eq!(feed.calls(), 0);
    }

    #[tokio::test]
    async fn stale_cache_refetches() {
        let feed = ScriptedFeed::new(90_000.0);
        let oracle = PriceOracle::new(feed.clone());
        let now = Timestamp::now();
        oracle.seed(100_000.0, now).await;

        let later = now.plus(Duration::minutes(10));
        let rate = oracle.get_at(later).await.unwrap();

        assert_eq!(rate, 90_000.0);
        assert_eq!(feed.calls(), 1);
        assert_eq!(oracle.cached().await.unwrap().fetched_at, later);
    }

    #[tokio::test]
    async fn empty_cache_fetches() {
        let feed = ScriptedFeed::new(65_000.0);
        let oracle = PriceOracle::new(feed.clone());

        assert_eq!(oracle.get().await.unwrap(), 65_000.0);
        assert_eq!(oracle.get().await.unwrap(), 65_000.0);
        assert_eq!(feed.calls(), 1);
    }

    // ══════════════════════════════════════════════════════════════
    // Failure fallback
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn failed_fetch_falls_back_to_stale_value() {
        let oracle = PriceOracle::new(ScriptedFeed::failing());
        let now = Timestamp::now();
        oracle.seed(100_000.0, now.minus_days(1)).await;

        assert_eq!(oracle.get_at(now).await.unwrap(), 100_000.0);
    }

    #[tokio::test]
    async fn failed_fetch_without_history_is_unavailable() {
        let oracle = PriceOracle::new(ScriptedFeed::failing());
        let result = oracle.get().await;
        assert!(matches!(result, Err(PriceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn non_positive_rate_is_treated_as_failure() {
        let oracle = PriceOracle::new(ScriptedFeed::new(0.0));
        assert!(oracle.get().await.is_err());
        assert!(oracle.cached().await.is_none());
    }

    #[tokio::test]
    async fn implausible_rate_is_treated_as_failure() {
        let oracle = PriceOracle::new(ScriptedFeed::new(1e40));
        oracle.seed(70_000.0, Timestamp::now().minus_days(1)).await;

        assert_eq!(oracle.get().await.unwrap(), 70_000.0);
        assert_eq!(oracle.cached().await.map(|s| s.rate), Some(70_000.0));
    }

    #[tokio::test]
    async fn custom_ttl_is_honoured() {
        let feed = ScriptedFeed::new(1.0);
        let oracle = PriceOracle::with_ttl(feed.clone(), Duration::seconds(5));
        let now = Timestamp::now();
        oracle.seed(2.0, now).await;

        assert_eq!(oracle.get_at(now.plus(Duration::seconds(4))).await.unwrap(), 2.0);
        assert_eq!(oracle.get_at(now.plus(Duration::seconds(6))).await.unwrap(), 1.0);
    }
}
