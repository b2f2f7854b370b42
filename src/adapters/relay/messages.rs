//! Relay wire messages.
//!
//! Client → relay: `["REQ", sub_id, filter]`, `["CLOSE", sub_id]`, `["EVENT", event]`.
//! Relay → client: `["EVENT", sub_id, event]`, `["EOSE", sub_id]`,
//! `["OK", event_id, accepted, message]`, `["NOTICE", message]`,
//! `["CLOSED", sub_id, message]`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::zap::NostrEvent;

use super::RelayError;

/// Subscription filter sent with `REQ`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<u16>,

    /// Values of `p` tags to match.
    #[serde(rename = "#p", default, skip_serializing_if = "Vec::is_empty")]
    pub p_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,
}

/// Messages sent to a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Req {
        subscription_id: String,
        filter: SubscriptionFilter,
    },
    Close {
        subscription_id: String,
    },
    Event(NostrEvent),
}

impl ClientMessage {
    pub fn to_json(&self) -> String {
        match self {
            ClientMessage::Req {
                subscription_id,
                filter,
            } => json!(["REQ", subscription_id, filter]),
            ClientMessage::Close { subscription_id } => json!(["CLOSE", subscription_id]),
            ClientMessage::Event(event) => json!(["EVENT", event]),
        }
        .to_string()
    }
}

/// Messages received from a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    Event {
        subscription_id: String,
        event: NostrEvent,
    },
    Eose {
        subscription_id: String,
    },
    Ok {
        event_id: String,
        accepted: bool,
        message: String,
    },
    Notice(String),
    Closed {
        subscription_id: String,
        message: String,
    },
}

impl RelayMessage {
    /// Parses a text frame.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| RelayError::Protocol(e.to_string()))?;
        let items = value
            .as_array()
            .ok_or_else(|| RelayError::Protocol("message is not an array".to_string()))?;

        let label = items.first().and_then(Value::as_str).unwrap_or("");
        let str_at = |i: usize| -> Result<String, RelayError> {
            items
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| RelayError::Protocol(format!("{} missing field {}", label, i)))
        };
        let optional_str_at =
            |i: usize| items.get(i).and_then(Value::as_str).unwrap_or("").to_string();

        match label {
            "EVENT" => {
                let raw = items
                    .get(2)
                    .ok_or_else(|| RelayError::Protocol("EVENT missing event".to_string()))?;
                let event = NostrEvent::deserialize(raw)
                    .map_err(|e| RelayError::Protocol(format!("invalid event: {}", e)))?;
                Ok(RelayMessage::Event {
                    subscription_id: str_at(1)?,
                    event,
                })
            }
            "EOSE" => Ok(RelayMessage::Eose {
                subscription_id: str_at(1)?,
            }),
            "OK" => Ok(RelayMessage::Ok {
                event_id: str_at(1)?,
                accepted: items.get(2).and_then(Value::as_bool).unwrap_or(false),
                message: optional_str_at(3),
            }),
            "NOTICE" => Ok(RelayMessage::Notice(optional_str_at(1))),
            "CLOSED" => Ok(RelayMessage::Closed {
                subscription_id: str_at(1)?,
                message: optional_str_at(2),
            }),
            other => Err(RelayError::Protocol(format!("unknown message type '{}'", other))),
        }
    }
}
