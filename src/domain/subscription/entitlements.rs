//! Tier-based entitlements.
//!
//! Defines what each subscription tier grants. An account stores a snapshot
//! of its tier's entitlements, recomputed whenever the tier is written.

use super::SubscriptionTier;
use serde::{Deserialize, Serialize};

/// Entitlement snapshot for a subscription tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierEntitlements {
    /// The tier these entitlements apply to.
    pub tier: SubscriptionTier,
    /// Maximum push notifications per day. None = unlimited.
    pub daily_notification_limit: Option<u32>,
    /// Days of notification history kept.
    pub history_retention_days: u32,
    /// Whether notifications are delivered on the priority queue.
    pub priority_delivery: bool,
    /// Whether user-defined notification filters are enabled.
    pub custom_filters: bool,
}

impl TierEntitlements {
    /// Get the entitlements for a specific tier.
    ///
    /// # Tier Configuration
    ///
    /// | Tier | Notifications/day | History | Priority | Filters |
    /// |------|-------------------|---------|----------|---------|
    /// | Free | 50 | 7 days | No | No |
    /// | Premium | 500 | 90 days | Yes | No |
    /// | Premium+ | Unlimited | 365 days | Yes | Yes |
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => Self {
                tier,
                daily_notification_limit: Some(50),
                history_retention_days: 7,
                priority_delivery: false,
                custom_filters: false,
            },
            SubscriptionTier::Premium => Self {
                tier,
                daily_notification_limit: Some(500),
                history_retention_days: 90,
                priority_delivery: true,
                custom_filters: false,
            },
            SubscriptionTier::PremiumPlus => Self {
                tier,
                daily_notification_limit: None,
                history_retention_days: 365,
                priority_delivery: true,
                custom_filters: true,
            },
        }
    }

    /// Check if the daily notification allowance has been used up.
    ///
    /// Returns false if unlimited or under limit.
    pub fn notification_limit_reached(&self, sent_today: u32) -> bool {
        self.daily_notification_limit
            .map(|max| sent_today >= max)
            .unwrap_or(false)
    }
}
