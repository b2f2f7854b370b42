//! Subscription domain module.
//!
//! Tiers, entitlements, and the account subscription state that gifts mutate.
//!
//! # Module Structure
//!
//! - `tier` - SubscriptionTier levels
//! - `entitlements` - What each tier grants
//! - `account` - Account subscription state and the gift state machine

mod account;
mod entitlements;
mod tier;

pub use account::{gift_duration, Account, ExpiryOutOfRange, GiftTransition, GIFT_MONTH_DAYS};
pub use entitlements::TierEntitlements;
pub use tier::SubscriptionTier;
