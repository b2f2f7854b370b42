//! Account subscription state.
//!
//! The account itself lives in an external store; this module owns the
//! subscription fields a gift is allowed to mutate and the rules for doing so.
//!
//! # Design Decisions
//!
//! - **Month = 31 days**: gift durations are `months × 31 days`, not calendar months
//! - **Extend, don't reset**: an active subscription is extended from its current
//!   expiry, never from "now"
//! - **Tier overwrite**: the gifted tier replaces the stored tier, even when that
//!   is a downgrade (kept deliberately; see DESIGN.md)

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{PublicKey, Timestamp};

use super::{SubscriptionTier, TierEntitlements};

/// Days credited per gifted month.
pub const GIFT_MONTH_DAYS: i64 = 31;

/// Total subscription time granted by a gift of `months`.
pub fn gift_duration(months: u8) -> Duration {
    Duration::days(GIFT_MONTH_DAYS * i64::from(months))
}

/// A gift would move the expiry outside the representable time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Subscription expiry out of range")]
pub struct ExpiryOutOfRange;

/// An account's subscription record as seen by the gift processor.
///
/// # Invariants
///
/// - `entitlements.tier == tier`
/// - A gift never moves `expires_at` backwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Identity of the account holder.
    pub pubkey: PublicKey,

    /// Current subscription tier.
    pub tier: SubscriptionTier,

    /// When the paid subscription lapses. None = never subscribed.
    pub expires_at: Option<Timestamp>,

    /// Entitlements snapshot for `tier`.
    pub entitlements: TierEntitlements,

    /// Optional display handle. Gift-created accounts have none.
    pub username: Option<String>,

    /// When the account was created.
    pub created_at: Timestamp,

    /// When the account was last updated.
    pub updated_at: Timestamp,
}

/// How a gift changed an account's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftTransition {
    /// No account existed; one was created with the gifted subscription.
    Created,
    /// The subscription was active and its expiry pushed out.
    Extended { previous_expiry: Timestamp },
    /// The subscription had lapsed (or never existed) and was restarted from now.
    Restarted { previous_expiry: Option<Timestamp> },
}

impl Account {
    /// Create a free account with no subscription.
    pub fn new_free(pubkey: PublicKey, now: Timestamp) -> Self {
        Self {
            pubkey,
            tier: SubscriptionTier::Free,
            expires_at: None,
            entitlements: TierEntitlements::for_tier(SubscriptionTier::Free),
            username: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an account for a gift recipient who has never been seen.
    pub fn from_gift(
        pubkey: PublicKey,
        tier: SubscriptionTier,
        months: u8,
        now: Timestamp,
    ) -> Result<Self, ExpiryOutOfRange> {
        let expires_at = now
            .checked_plus(gift_duration(months))
            .ok_or(ExpiryOutOfRange)?;
        Ok(Self {
            pubkey,
            tier,
            expires_at: Some(expires_at),
            entitlements: TierEntitlements::for_tier(tier),
            username: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check whether the paid subscription is running at `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.expires_at.map(|e| e.is_after(&now)).unwrap_or(false)
    }

    /// Apply a gift of `months` at `tier` to an existing account.
    ///
    /// Active subscriptions are extended from their current expiry; lapsed ones
    /// restart from `now`. The tier is overwritten and entitlements recomputed
    /// in both cases. On error the account is left untouched.
    pub fn apply_gift(
        &mut self,
        tier: SubscriptionTier,
        months: u8,
        now: Timestamp,
    ) -> Result<GiftTransition, ExpiryOutOfRange> {
        let (base, transition) = match self.expires_at {
            Some(expiry) if expiry.is_after(&now) => (
                expiry,
                GiftTransition::Extended {
                    previous_expiry: expiry,
                },
            ),
            previous => (
                now,
                GiftTransition::Restarted {
                    previous_expiry: previous,
                },
            ),
        };
        let expires_at = base
            .checked_plus(gift_duration(months))
            .ok_or(ExpiryOutOfRange)?;

        self.expires_at = Some(expires_at);
        self.tier = tier;
        self.entitlements = TierEntitlements::for_tier(tier);
        self.updated_at = now;

        Ok(transition)
    }
}
