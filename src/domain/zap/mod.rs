//! Zap module - relay event model, zap receipt parsing, and gift payloads.

mod errors;
mod event;
mod gift;
mod json_repair;
mod parser;
mod receipt;
mod request;

pub use errors::ZapParseError;
pub use event::{
    compute_event_id, EventTemplate, NostrEvent, Tag, VerifyError, TEXT_NOTE_KIND,
    ZAP_RECEIPT_KIND, ZAP_REQUEST_KIND,
};
pub use gift::{GiftPayload, MAX_GIFT_MONTHS, MIN_GIFT_MONTHS};
pub use json_repair::{context_window, escape_control_chars, is_repairable_control};
pub use parser::{ParsedZap, ZapEventParser};
pub use receipt::ZapReceipt;
pub use request::ZapRequest;
