//! Subscription tier definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription tier of an account.
///
/// Determines entitlements and notification allowance. Only the paid tiers
/// can be gifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionTier {
    /// Default tier for accounts without a paid subscription.
    Free,

    /// Paid tier with raised notification allowance.
    Premium,

    /// Top paid tier, unlimited notifications and custom filters.
    PremiumPlus,
}

impl SubscriptionTier {
    /// Returns the wire name used in gift payloads and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::PremiumPlus => "premium-plus",
        }
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "Free",
            SubscriptionTier::Premium => "Premium",
            SubscriptionTier::PremiumPlus => "Premium+",
        }
    }

    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }

    /// Parses a tier named in a gift payload.
    ///
    /// Matching is exact: only `premium` and `premium-plus` are giftable.
    pub fn parse_giftable(value: &str) -> Option<Self> {
        match value {
            "premium" => Some(SubscriptionTier::Premium),
            "premium-plus" => Some(SubscriptionTier::PremiumPlus),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for SubscriptionTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionTier::Free),
            other => SubscriptionTier::parse_giftable(other).ok_or_else(|| {
                ValidationError::invalid_format("tier", format!("unknown tier '{}'", other))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_is_not_paid() {
        assert!(!SubscriptionTier::Free.is_paid());
        assert!(SubscriptionTier::Premium.is_paid());
        assert!(SubscriptionTier::PremiumPlus.is_paid());
    }

    #[test]
    fn giftable_parse_is_exact() {
        assert_eq!(
            SubscriptionTier::parse_giftable("premium"),
            Some(SubscriptionTier::Premium)
        );
        assert_eq!(
            SubscriptionTier::parse_giftable("premium-plus"),
            Some(SubscriptionTier::PremiumPlus)
        );
        assert_eq!(SubscriptionTier::parse_giftable("Premium"), None);
        assert_eq!(SubscriptionTier::parse_giftable("premium_plus"), None);
        assert_eq!(SubscriptionTier::parse_giftable("free"), None);
    }

    #[test]
    fn from_str_accepts_free() {
        assert_eq!("free".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Free);
        assert!("gold".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn tier_serializes_kebab_case() {
        let json = serde_json::to_string(&SubscriptionTier::PremiumPlus).unwrap();
        assert_eq!(json, "\"premium-plus\"");
    }

    #[test]
    fn wire_name_matches_serde() {
        for tier in [
            SubscriptionTier::Free,
            SubscriptionTier::Premium,
            SubscriptionTier::PremiumPlus,
        ] {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.as_str()));
        }
    }
}
