//! Turns raw relay events into typed zaps.
//!
//! The parser is the only place that looks at raw tags. Everything past this
//! point works with [`ZapReceipt`] and [`GiftPayload`].

use serde_json::Value;

use crate::domain::foundation::PublicKey;

use super::json_repair::{context_window, escape_control_chars};
use super::{GiftPayload, NostrEvent, ZapParseError, ZapReceipt, ZapRequest};
use super::{ZAP_RECEIPT_KIND, ZAP_REQUEST_KIND};

/// Characters of context logged either side of a JSON error.
const CONTEXT_RADIUS: usize = 40;

/// A successfully parsed receipt, routed by recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedZap {
    /// Zap addressed to the service identity carrying a valid gift.
    Gift {
        receipt: ZapReceipt,
        gift: GiftPayload,
    },
    /// Any other zap. Forwarded to notification delivery.
    Plain { receipt: ZapReceipt },
}

impl ParsedZap {
    pub fn receipt(&self) -> &ZapReceipt {
        match self {
            ParsedZap::Gift { receipt, .. } | ParsedZap::Plain { receipt } => receipt,
        }
    }
}

/// Parses zap receipts and routes them as gift or plain zaps.
#[derive(Debug, Clone)]
pub struct ZapEventParser {
    service_pubkey: PublicKey,
}

impl ZapEventParser {
    pub fn new(service_pubkey: PublicKey) -> Self {
        Self { service_pubkey }
    }

    pub fn service_pubkey(&self) -> &PublicKey {
        &self.service_pubkey
    }

    /// Parses a receipt event.
    ///
    /// # Errors
    ///
    /// Any error means the event is dropped without a processed record.
    /// The receipt id is the idempotency key, so an event whose id or
    /// signature does not verify is rejected before anything else is read.
    pub fn parse(&self, event: NostrEvent) -> Result<ParsedZap, ZapParseError> {
        if event.kind != ZAP_RECEIPT_KIND {
            return Err(ZapParseError::NotAReceipt(event.kind));
        }
        event.verify()?;

        let bolt11 = event
            .first_tag_value("bolt11")
            .ok_or(ZapParseError::MissingTag("bolt11"))?
            .to_string();
        let description = event
            .first_tag_value("description")
            .ok_or(ZapParseError::MissingTag("description"))?
            .to_string();

        let request = parse_request(&event.id, &description)?;
        if request.kind != ZAP_REQUEST_KIND {
            return Err(ZapParseError::WrongRequestKind(request.kind));
        }

        let is_gift = request.is_addressed_to(self.service_pubkey.as_str());
        let gift = if is_gift {
            Some(GiftPayload::parse(&request.content)?)
        } else {
            None
        };

        let receipt = ZapReceipt::new(event, bolt11, description, request);
        Ok(match gift {
            Some(gift) => ParsedZap::Gift { receipt, gift },
            None => ParsedZap::Plain { receipt },
        })
    }
}

/// Strict parse, then a single control-character repair attempt.
fn parse_request(event_id: &str, description: &str) -> Result<ZapRequest, ZapParseError> {
    let value = match serde_json::from_str::<Value>(description) {
        Ok(value) => value,
        Err(strict_err) => {
            tracing::debug!(
                event_id = %event_id,
                error = %strict_err,
                context = %context_window(description, strict_err.line(), strict_err.column(), CONTEXT_RADIUS),
                "Strict description parse failed, attempting control-character repair"
            );

            let repaired = escape_control_chars(description)
                .ok_or_else(|| ZapParseError::InvalidDescription(strict_err.to_string()))?;

            match serde_json::from_str::<Value>(&repaired) {
                Ok(value) => {
                    tracing::info!(event_id = %event_id, "Description parsed after repair");
                    value
                }
                Err(repair_err) => {
                    tracing::warn!(
                        event_id = %event_id,
                        error = %repair_err,
                        context = %context_window(&repaired, repair_err.line(), repair_err.column(), CONTEXT_RADIUS),
                        "Description unparseable after repair"
                    );
                    return Err(ZapParseError::InvalidDescription(repair_err.to_string()));
                }
            }
        }
    };

    serde_json::from_value(value).map_err(|e| ZapParseError::InvalidDescription(e.to_string()))
}
