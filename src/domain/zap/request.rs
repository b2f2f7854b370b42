//! Zap request embedded in a receipt's `description` tag.

use serde::{Deserialize, Serialize};

use super::event::{first_tag_value, tag_values, Tag};

/// The original payment-intent event, as signed by the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZapRequest {
    /// Request id, when the provider kept it.
    #[serde(default)]
    pub id: Option<String>,
    /// Kind marker; must be the zap request kind.
    pub kind: u16,
    /// Sender public key (hex).
    pub pubkey: String,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Free text. For gifts this carries the gift fields.
    #[serde(default)]
    pub content: String,
}

impl ZapRequest {
    /// Requested amount in millisats from the `amount` tag.
    pub fn amount_msats(&self) -> Option<u64> {
        first_tag_value(&self.tags, "amount").and_then(|v| v.trim().parse().ok())
    }

    /// Relay hints from every `relays` tag, in order.
    pub fn relay_hints(&self) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|t| t.name() == "relays")
            .flat_map(|t| t.values().iter().map(String::as_str))
            .collect()
    }

    /// Public keys named in `p` tags.
    pub fn recipient_pubkeys(&self) -> impl Iterator<Item = &str> + '_ {
        tag_values(&self.tags, "p")
    }

    /// Event referenced by the first `e` tag, if any.
    pub fn zapped_event(&self) -> Option<&str> {
        first_tag_value(&self.tags, "e")
    }

    /// True if any `p` tag names `pubkey` (case-insensitive).
    pub fn is_addressed_to(&self, pubkey: &str) -> bool {
        self.recipient_pubkeys()
            .any(|p| p.eq_ignore_ascii_case(pubkey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ZapRequest {
        ZapRequest {
            id: None,
            kind: 9734,
            pubkey: "sender".into(),
            created_at: 0,
            tags: vec![
                Tag::new("amount", ["21000"]),
                Tag::new("relays", ["wss://a", "wss://b"]),
                Tag::new("relays", ["wss://c"]),
                Tag::new("p", ["ABCD"]),
                Tag::new("e", ["note1"]),
            ],
            content: String::new(),
        }
    }

    #[test]
    fn amount_parses_millisats() {
        assert_eq!(request().amount_msats(), Some(21_000));
    }

    #[test]
    fn amount_missing_or_garbage_is_none() {
        let mut r = request();
        r.tags.retain(|t| t.name() != "amount");
        assert_eq!(r.amount_msats(), None);

        r.tags.push(Tag::new("amount", ["lots"]));
        assert_eq!(r.amount_msats(), None);
    }

    #[test]
    fn relay_hints_flatten_all_relays_tags() {
        assert_eq!(request().relay_hints(), vec!["wss://a", "wss://b", "wss://c"]);
    }

    #[test]
    fn addressing_is_case_insensitive() {
        let r = request();
        assert!(r.is_addressed_to("abcd"));
        assert!(!r.is_addressed_to("ef01"));
        assert_eq!(r.zapped_event(), Some("note1"));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let r: ZapRequest =
            serde_json::from_str(r#"{"kind":9734,"pubkey":"aa","tags":[["p","bb"]]}"#).unwrap();
        assert_eq!(r.content, "");
        assert!(r.id.is_none());
        assert!(r.is_addressed_to("bb"));
    }
}
