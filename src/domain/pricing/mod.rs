//! Pricing module - tier prices and the cached USD/BTC rate.

mod errors;
mod oracle;
mod tier_pricing;

pub use errors::PriceError;
pub use oracle::{PriceOracle, PriceSample, MAX_USD_PER_BTC, PRICE_TTL_MINUTES};
pub use tier_pricing::TierPricing;
