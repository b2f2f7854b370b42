//! Price errors.

use thiserror::Error;

/// Errors returned by the price oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// No fresh price and no previously fetched value to fall back on.
    #[error("BTC price unavailable: {0}")]
    Unavailable(String),
}
