//! Gift payload carried in a zap request's content.
//!
//! ```text
//! Gift subscription            <- banner, ignored
//! <64-hex recipient pubkey>
//! premium | premium-plus
//! <months 1..=12>
//! optional message, may span lines
//! ```

use crate::domain::foundation::PublicKey;
use crate::domain::subscription::SubscriptionTier;

use super::ZapParseError;

/// Smallest giftable duration in months.
pub const MIN_GIFT_MONTHS: u8 = 1;

/// Largest giftable duration in months.
pub const MAX_GIFT_MONTHS: u8 = 12;

/// A validated gift request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftPayload {
    pub recipient: PublicKey,
    pub tier: SubscriptionTier,
    pub months: u8,
    pub message: Option<String>,
}

impl GiftPayload {
    /// Parses gift content.
    ///
    /// Lines are trimmed and blank lines dropped before fields are read.
    pub fn parse(content: &str) -> Result<Self, ZapParseError> {
        let fields: Vec<&str> = content
            .trim()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if fields.len() < 4 {
            return Err(ZapParseError::gift(format!(
                "expected at least 4 fields, got {}",
                fields.len()
            )));
        }

        let recipient = PublicKey::parse(fields[1])
            .map_err(|_| ZapParseError::gift("recipient is not a 64-character hex key"))?;

        let tier = SubscriptionTier::parse_giftable(fields[2])
            .ok_or_else(|| ZapParseError::gift(format!("unknown subscription type '{}'", fields[2])))?;

        let months = Some(fields[3])
            .filter(|m| m.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|m| m.parse::<u8>().ok())
            .filter(|m| (MIN_GIFT_MONTHS..=MAX_GIFT_MONTHS).contains(m))
            .ok_or_else(|| ZapParseError::gift(format!("months '{}' not in 1..=12", fields[3])))?;

        let message = if fields.len() > 4 {
            Some(fields[4..].join("\n"))
        } else {
            None
        };

        Ok(Self {
            recipient,
            tier,
            months,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RECIPIENT: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn content(recipient: &str, tier: &str, months: &str) -> String {
        format!("Gift subscription\n{}\n{}\n{}", recipient, tier, months)
    }

    #[test]
    fn parses_minimal_gift() {
        let gift = GiftPayload::parse(&content(RECIPIENT, "premium", "1")).unwrap();
        assert_eq!(gift.recipient.as_str(), RECIPIENT);
        assert_eq!(gift.tier, SubscriptionTier::Premium);
        assert_eq!(gift.months, 1);
        assert_eq!(gift.message, None);
    }

    #[test]
    fn uppercase_recipient_is_normalized() {
        let gift = GiftPayload::parse(&content(&RECIPIENT.to_uppercase(), "premium-plus", "12")).unwrap();
        assert_eq!(gift.recipient.as_str(), RECIPIENT);
        assert_eq!(gift.tier, SubscriptionTier::PremiumPlus);
        assert_eq!(gift.months, 12);
    }

    #[test]
    fn blank_lines_and_padding_are_ignored() {
        let raw = format!("\n\n  Gift  \n\n  {}  \r\n\npremium\n 3 \n\n", RECIPIENT);
        let gift = GiftPayload::parse(&raw).unwrap();
        assert_eq!(gift.months, 3);
    }

    #[test]
    fn remaining_lines_become_message() {
        let raw = format!("{}\nHappy birthday!\n\nEnjoy", content(RECIPIENT, "premium", "2"));
        let gift = GiftPayload::parse(&raw).unwrap();
        assert_eq!(gift.message.as_deref(), Some("Happy birthday!\nEnjoy"));
    }

    #[test]
    fn rejects_short_recipient() {
        assert!(GiftPayload::parse(&content(&RECIPIENT[..63], "premium", "1")).is_err());
    }

    #[test]
    fn rejects_npub_style_recipient() {
        assert!(GiftPayload::parse(&content("npub1xyz", "premium", "1")).is_err());
    }

    #[test]
    fn rejects_unknown_tier() {
        for tier in ["Premium", "premium_plus", "free", "gold", ""] {
            assert!(GiftPayload::parse(&content(RECIPIENT, tier, "1")).is_err(), "{tier}");
        }
    }

    #[test]
    fn rejects_months_out_of_range() {
        for months in ["0", "13", "-1", "+3", "1.5", "01x", "twelve", "256"] {
            assert!(GiftPayload::parse(&content(RECIPIENT, "premium", months)).is_err(), "{months}");
        }
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(GiftPayload::parse("").is_err());
        assert!(GiftPayload::parse(&format!("Gift\n{}\npremium", RECIPIENT)).is_err());
    }

    proptest! {
        #[test]
        fn any_valid_month_parses(months in 1u8..=12) {
            let gift = GiftPayload::parse(&content(RECIPIENT, "premium", &months.to_string())).unwrap();
            prop_assert_eq!(gift.months, months);
        }

        #[test]
        fn arbitrary_content_never_panics(s in any::<String>()) {
            let _ = GiftPayload::parse(&s);
        }
    }
}
