//! Price feed adapters.

mod http_price_feed;

pub use http_price_feed::{HttpPriceFeed, HttpPriceFeedConfig, DEFAULT_PRICE_FEED_URL};
