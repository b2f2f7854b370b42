//! Monthly list price per tier.

use serde::{Deserialize, Serialize};

use crate::domain::subscription::SubscriptionTier;

/// Monthly prices in US cents for the giftable tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPricing {
    pub premium_monthly_cents: u64,
    pub premium_plus_monthly_cents: u64,
}

impl TierPricing {
    pub fn new(premium_monthly_cents: u64, premium_plus_monthly_cents: u64) -> Self {
        Self {
            premium_monthly_cents,
            premium_plus_monthly_cents,
        }
    }

    /// Monthly price for `tier`. Free is always zero.
    pub fn monthly_price_cents(&self, tier: SubscriptionTier) -> u64 {
        match tier {
            SubscriptionTier::Free => 0,
            SubscriptionTier::Premium => self.premium_monthly_cents,
            SubscriptionTier::PremiumPlus => self.premium_plus_monthly_cents,
        }
    }

    /// Total expected price for `months` of `tier`.
    pub fn expected_cents(&self, tier: SubscriptionTier, months: u8) -> u64 {
        self.monthly_price_cents(tier) * u64::from(months)
    }
}

impl Default for TierPricing {
    fn default() -> Self {
        Self::new(1000, 2000)
    }
}
