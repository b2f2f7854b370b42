//! Validated zap receipt produced at the parser boundary.

use crate::domain::foundation::EventId;

use super::{NostrEvent, ZapRequest};

/// A zap receipt whose required tags and embedded request have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZapReceipt {
    event: NostrEvent,
    bolt11: String,
    description: String,
    request: ZapRequest,
}

impl ZapReceipt {
    pub(crate) fn new(
        event: NostrEvent,
        bolt11: String,
        description: String,
        request: ZapRequest,
    ) -> Self {
        Self {
            event,
            bolt11,
            description,
            request,
        }
    }

    /// Receipt event id, the idempotency key.
    pub fn id(&self) -> EventId {
        EventId::from_string(&self.event.id)
    }

    /// Public key of the wallet provider that signed the receipt.
    pub fn signer(&self) -> &str {
        &self.event.pubkey
    }

    /// Public key of the person who paid.
    pub fn sender(&self) -> &str {
        &self.request.pubkey
    }

    /// Lightning invoice paid.
    pub fn bolt11(&self) -> &str {
        &self.bolt11
    }

    /// Raw `description` tag as received.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Recipient keys named on the request.
    pub fn recipient_pubkeys(&self) -> Vec<&str> {
        self.request.recipient_pubkeys().collect()
    }

    /// Amount in millisats requested by the sender, 0 if absent.
    pub fn amount_msats(&self) -> u64 {
        self.request.amount_msats().unwrap_or(0)
    }

    /// Relay hints carried on the request.
    pub fn relay_hints(&self) -> Vec<&str> {
        self.request.relay_hints()
    }

    /// The embedded request.
    pub fn request(&self) -> &ZapRequest {
        &self.request
    }

    /// The raw receipt event.
    pub fn event(&self) -> &NostrEvent {
        &self.event
    }

    /// Receipt creation time (unix seconds).
    pub fn created_at(&self) -> u64 {
        self.event.created_at
    }
}
