//! NotificationPublisher - best-effort gift confirmation broadcast.
//!
//! The confirmation is a signed public note tagging the recipient, the sender
//! and the receipt. It is published to the relay hints on the original request
//! plus the operator relays. Failures are logged and counted, never raised.

use std::sync::Arc;

use url::Url;

use crate::domain::foundation::{PublicKey, Timestamp};
use crate::domain::zap::{EventTemplate, GiftPayload, Tag, ZapReceipt, TEXT_NOTE_KIND};
use crate::ports::{EventSigner, RelayPublisher};

/// Topic tag attached to confirmations.
pub const GIFT_TOPIC: &str = "gift-subscription";

/// Per-relay publish counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub event_id: Option<String>,
    pub succeeded: usize,
    pub failed: usize,
}

impl PublishSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Builds, signs and broadcasts gift confirmations.
pub struct NotificationPublisher {
    signer: Arc<dyn EventSigner>,
    publisher: Arc<dyn RelayPublisher>,
    operator_relays: Vec<String>,
}

impl NotificationPublisher {
    pub fn new(
        signer: Arc<dyn EventSigner>,
        publisher: Arc<dyn RelayPublisher>,
        operator_relays: Vec<String>,
    ) -> Self {
        Self {
            signer,
            publisher,
            operator_relays,
        }
    }

    /// Unsigned confirmation for a gift.
    pub fn build_confirmation(
        &self,
        receipt: &ZapReceipt,
        gift: &GiftPayload,
        now: Timestamp,
    ) -> EventTemplate {
        let mut content = format!(
            "Gift subscription activated: {} received {} month{} of {} from {}.",
            mention(gift.recipient.as_str()),
            gift.months,
            if gift.months == 1 { "" } else { "s" },
            gift.tier.display_name(),
            mention(receipt.sender())
        );
        if let Some(message) = &gift.message {
            content.push_str("\n\n");
            content.push_str(message);
        }

        EventTemplate {
            created_at: now.as_unix_secs(),
            kind: TEXT_NOTE_KIND,
            tags: vec![
                Tag::new("p", [gift.recipient.as_str()]),
                Tag::new("p", [receipt.sender()]),
                Tag::new("e", [receipt.id().as_str()]),
                Tag::new("t", [GIFT_TOPIC]),
            ],
            content,
        }
    }

    /// Request relay hints followed by operator relays, de-duplicated.
    ///
    /// Hints that are not `ws://` or `wss://` URLs are dropped.
    pub fn relay_set(&self, receipt: &ZapReceipt) -> Vec<String> {
        let mut relays: Vec<String> = Vec::new();
        let hints = receipt.relay_hints().into_iter().filter_map(|hint| {
            let url = Url::parse(hint.trim()).ok()?;
            matches!(url.scheme(), "ws" | "wss").then(|| hint.trim().to_string())
        });

        for relay in hints.chain(self.operator_relays.iter().cloned()) {
            let key = relay.trim_end_matches('/');
            if !relays.iter().any(|r| r.trim_end_matches('/') == key) {
                relays.push(relay);
            }
        }
        relays
    }

    /// Signs and publishes the confirmation. Never fails.
    pub async fn publish(&self, receipt: &ZapReceipt, gift: &GiftPayload) -> PublishSummary {
        let template = self.build_confirmation(receipt, gift, Timestamp::now());
        let event = match self.signer.sign(template) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(
                    event_id = %receipt.id(),
                    error = %e,
                    "Failed to sign gift confirmation"
                );
                return PublishSummary::default();
            }
        };

        let relays = self.relay_set(receipt);
        let results = self.publisher.publish(&relays, &event).await;

        let mut summary = PublishSummary {
            event_id: Some(event.id.clone()),
            ..PublishSummary::default()
        };
        for result in &results {
            match &result.outcome {
                Ok(()) => summary.succeeded += 1,
                Err(reason) => {
                    summary.failed += 1;
                    tracing::warn!(
                        relay = %result.relay_url,
                        reason = %reason,
                        "Confirmation publish failed"
                    );
                }
            }
        }

        tracing::info!(
            event_id = %receipt.id(),
            confirmation_id = %event.id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Gift confirmation published"
        );
        summary
    }
}

/// `nostr:npub...` reference to a key, or the raw value if it is not a key.
fn mention(hex_key: &str) -> String {
    match PublicKey::parse(hex_key).and_then(|key| key.to_npub()) {
        Ok(npub) => format!("nostr:{}", npub),
        Err(_) => hex_key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::signing::SchnorrSigner;
    use crate::domain::subscription::SubscriptionTier;
    use crate::domain::zap::{NostrEvent, ParsedZap, ZapEventParser, ZAP_RECEIPT_KIND};
    use crate::ports::{RelayPublishResult, SigningError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const SERVICE: &str = "5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e";
    const RECIPIENT: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct FakeSigner {
        fail: bool,
    }

    impl EventSigner for FakeSigner {
        fn public_key(&self) -> &str {
            SERVICE
        }

        fn sign(&self, template: EventTemplate) -> Result<NostrEvent, SigningError> {
            if self.fail {
                return Err(SigningError::InvalidKey("no key".into()));
            }
            Ok(NostrEvent {
                id: "c0".repeat(32),
                pubkey: SERVICE.into(),
                created_at: template.created_at,
                kind: template.kind,
                tags: template.tags,
                content: template.content,
                sig: "00".repeat(64),
            })
        }
    }

    /// Accepts on relays whose URL contains "good".
    #[derive(Default)]
    struct RecordingPublisher {
        calls: Mutex<Vec<(Vec<String>, NostrEvent)>>,
    }

    #[async_trait]
    impl RelayPublisher for RecordingPublisher {
        async fn publish(&self, relay_urls: &[String], event: &NostrEvent) -> Vec<RelayPublishResult> {
            self.calls
                .lock()
                .unwrap()
                .push((relay_urls.to_vec(), event.clone()));
            relay_urls
                .iter()
                .map(|url| {
                    if url.contains("good") {
                        RelayPublishResult::accepted(url)
                    } else {
                        RelayPublishResult::rejected(url, "connection refused")
                    }
                })
                .collect()
        }
    }

    fn parsed(hints: &[&str], message: Option<&str>) -> (ZapReceipt, GiftPayload) {
        let mut relays = vec!["relays".to_string()];
        relays.extend(hints.iter().map(|h| h.to_string()));
        let mut content = format!("Gift\n{}\npremium\n2", RECIPIENT);
        if let Some(m) = message {
            content.push('\n');
            content.push_str(m);
        }
        let description = json!({
            "kind": 9734,
            "pubkey": "ab".repeat(32),
            "tags": [["p", SERVICE], ["amount", "20000000"], relays],
            "content": content,
        })
        .to_string();
        let event = SchnorrSigner::from_secret_bytes(&[7u8; 32])
            .unwrap()
            .sign(EventTemplate {
                created_at: 1,
                kind: ZAP_RECEIPT_KIND,
                tags: vec![
                    Tag::new("bolt11", ["lnbc"]),
                    Tag::new("description", [description]),
                ],
                content: String::new(),
            })
            .unwrap();
        match ZapEventParser::new(PublicKey::parse(SERVICE).unwrap())
            .parse(event)
            .unwrap()
        {
            ParsedZap::Gift { receipt, gift } => (receipt, gift),
            other => panic!("expected gift, got {:?}", other),
        }
    }

    fn notifier(
        fail_sign: bool,
        operator: &[&str],
    ) -> (NotificationPublisher, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        (
            NotificationPublisher::new(
                Arc::new(FakeSigner { fail: fail_sign }),
                publisher.clone(),
                operator.iter().map(|s| s.to_string()).collect(),
            ),
            publisher,
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Content and tags
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn confirmation_tags_recipient_sender_and_receipt() {
        let (receipt, gift) = parsed(&[], None);
        let (notifier, _) = notifier(false, &[]);

        let template = notifier.build_confirmation(&receipt, &gift, Timestamp::now());

        assert_eq!(template.kind, TEXT_NOTE_KIND);
        assert_eq!(template.tags[0], Tag::new("p", [RECIPIENT]));
        assert_eq!(template.tags[1], Tag::new("p", ["ab".repeat(32)]));
        assert_eq!(template.tags[2], Tag::new("e", [receipt.id().as_str()]));
        assert_eq!(template.tags[3], Tag::new("t", [GIFT_TOPIC]));
        assert!(template.content.contains("2 months of Premium"));
        assert_eq!(gift.tier, SubscriptionTier::Premium);
    }

    #[test]
    fn confirmation_mentions_keys_as_npub_uris() {
        let (receipt, gift) = parsed(&[], None);
        let (notifier, _) = notifier(false, &[]);

        let template = notifier.build_confirmation(&receipt, &gift, Timestamp::now());

        let recipient = gift.recipient.to_npub().unwrap();
        let sender = PublicKey::parse(receipt.sender()).unwrap().to_npub().unwrap();
        assert!(template
            .content
            .starts_with(&format!("Gift subscription activated: nostr:{} received", recipient)));
        assert!(template.content.contains(&format!("from nostr:{}.", sender)));
        assert!(!template.content.contains(RECIPIENT));
    }

    #[test]
    fn mention_falls_back_to_raw_value() {
        assert_eq!(mention("not-a-key"), "not-a-key");
    }

    #[test]
    fn gift_message_is_appended() {
        let (receipt, gift) = parsed(&[], Some("Enjoy!"));
        let (notifier, _) = notifier(false, &[]);

        let template = notifier.build_confirmation(&receipt, &gift, Timestamp::now());
        assert!(template.content.ends_with("\n\nEnjoy!"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Relay selection
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn relay_set_is_union_of_hints_and_operator_relays() {
        let (receipt, _) = parsed(&["wss://a.example", "wss://shared.example/"], None);
        let (notifier, _) = notifier(false, &["wss://shared.example", "wss://op.example"]);

        assert_eq!(
            notifier.relay_set(&receipt),
            vec!["wss://a.example", "wss://shared.example/", "wss://op.example"]
        );
    }

    #[test]
    fn non_websocket_hints_are_dropped() {
        let (receipt, _) = parsed(&["https://web.example", "not a url", "ws://ok.example"], None);
        let (notifier, _) = notifier(false, &[]);

        assert_eq!(notifier.relay_set(&receipt), vec!["ws://ok.example"]);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Publishing
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn publish_counts_successes_and_failures() {
        let (receipt, gift) = parsed(&["wss://good.example", "wss://bad.example"], None);
        let (notifier, publisher) = notifier(false, &["wss://good-op.example"]);

        let summary = notifier.publish(&receipt, &gift).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.attempted(), 3);
        assert_eq!(summary.event_id, Some("c0".repeat(32)));
        assert_eq!(publisher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn signing_failure_publishes_nothing() {
        let (receipt, gift) = parsed(&["wss://good.example"], None);
        let (notifier, publisher) = notifier(true, &[]);

        let summary = notifier.publish(&receipt, &gift).await;

        assert_eq!(summary, PublishSummary::default());
        assert!(publisher.calls.lock().unwrap().is_empty());
    }
}
