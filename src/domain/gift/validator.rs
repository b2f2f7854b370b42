//! Payment validation for gift zaps.
//!
//! The paid amount is converted to cents at the current USD/BTC rate and
//! compared with the tier's list price, allowing a 10% shortfall to absorb
//! price-feed lag. The comparison is done in integers scaled by 10^8 so the
//! exact-boundary case is not at the mercy of float rounding.

use std::sync::Arc;

use crate::domain::pricing::{PriceOracle, TierPricing};
use crate::domain::subscription::SubscriptionTier;

/// Allowed underpayment, in percent of the list price.
pub const PAYMENT_TOLERANCE_PERCENT: u64 = 10;

const SATS_PER_BTC: u128 = 100_000_000;

/// Outcome of checking a gift payment.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentDecision {
    /// Payment covers the tier within tolerance.
    Accepted { amount_sats: u64, estimated_cents: f64 },
    /// Payment short; `message` states minimum, received and shortfall.
    Underpaid { amount_sats: u64, message: String },
    /// No price available. Validation fails closed.
    PriceUnavailable { message: String },
}

impl PaymentDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PaymentDecision::Accepted { .. })
    }
}

/// Checks paid amounts against tier prices at the current BTC rate.
pub struct PaymentValidator {
    pricing: TierPricing,
    oracle: Arc<PriceOracle>,
}

impl PaymentValidator {
    pub fn new(pricing: TierPricing, oracle: Arc<PriceOracle>) -> Self {
        Self { pricing, oracle }
    }

    pub fn pricing(&self) -> &TierPricing {
        &self.pricing
    }

    /// Validates `amount_msats` for `months` of `tier`.
    pub async fn validate(
        &self,
        tier: SubscriptionTier,
        months: u8,
        amount_msats: u64,
    ) -> PaymentDecision {
        match self.oracle.get().await {
            Ok(rate) => evaluate(&self.pricing, tier, months, amount_msats, rate),
            Err(e) => PaymentDecision::PriceUnavailable {
                message: format!("Cannot validate payment: {}", e),
            },
        }
    }
}

/// Pure payment check at a known USD/BTC `rate`.
pub fn evaluate(
    pricing: &TierPricing,
    tier: SubscriptionTier,
    months: u8,
    amount_msats: u64,
    rate: f64,
) -> PaymentDecision {
    let amount_sats = amount_msats / 1000;

    if !rate.is_finite() || rate <= 0.0 {
        return PaymentDecision::PriceUnavailable {
            message: format!("Cannot validate payment: invalid BTC rate {}", rate),
        };
    }

    let expected_cents = pricing.expected_cents(tier, months);
    let rate_cents = (rate * 100.0).round();
    if rate_cents >= u128::MAX as f64 {
        return PaymentDecision::PriceUnavailable {
            message: format!("Cannot validate payment: BTC rate {} out of range", rate),
        };
    }
    let rate_cents = rate_cents as u128;

    // amount_sats * rate_cents / SATS_PER_BTC >= expected * (100 - tol) / 100
    let paid = u128::from(amount_sats)
        .checked_mul(rate_cents)
        .and_then(|v| v.checked_mul(100));
    let required = u128::from(expected_cents)
        .checked_mul(u128::from(100 - PAYMENT_TOLERANCE_PERCENT))
        .and_then(|v| v.checked_mul(SATS_PER_BTC));
    let (paid, required) = match (paid, required) {
        (Some(paid), Some(required)) => (paid, required),
        _ => {
            return PaymentDecision::PriceUnavailable {
                message: format!("Cannot validate payment: BTC rate {} out of range", rate),
            }
        }
    };

    let estimated_cents = amount_sats as f64 * rate_cents as f64 / SATS_PER_BTC as f64;

    if paid >= required {
        return PaymentDecision::Accepted {
            amount_sats,
            estimated_cents,
        };
    }

    let minimum_cents =
        expected_cents as f64 * (100 - PAYMENT_TOLERANCE_PERCENT) as f64 / 100.0;
    let shortfall_cents = minimum_cents - estimated_cents;

    PaymentDecision::Underpaid {
        amount_sats,
        message: format!(
            "Underpaid by {:.2} cents: received {} sats (~{:.2} cents at ${:.2}/BTC), \
             minimum {:.2} cents for {} month(s) of {} (list {} cents)",
            shortfall_cents,
            amount_sats,
            estimated_cents,
            rate,
            minimum_cents,
            months,
            tier,
            expected_cents
        ),
    }
}
