//! Parse failures for zap receipts.
//!
//! Every variant means the event is dropped: it is logged and nothing is
//! recorded, because it never reached payment validation.

use thiserror::Error;

use super::VerifyError;

/// Errors that occur while turning a relay event into a zap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZapParseError {
    /// The event is not a zap receipt.
    #[error("Unexpected event kind {0}")]
    NotAReceipt(u16),

    /// The receipt's id or signature does not check out.
    #[error("Invalid receipt signature: {0}")]
    InvalidSignature(#[from] VerifyError),

    /// Required tag missing from the receipt.
    #[error("Missing tag: {0}")]
    MissingTag(&'static str),

    /// The description tag is not JSON, even after control-character repair.
    #[error("Invalid description JSON: {0}")]
    InvalidDescription(String),

    /// The embedded request is not a zap request.
    #[error("Embedded request has kind {0}, expected zap request")]
    WrongRequestKind(u16),

    /// Gift content failed field validation.
    #[error("Invalid gift content: {0}")]
    InvalidGiftContent(String),
}

impl ZapParseError {
    /// Creates a gift content error.
    pub fn gift(reason: impl Into<String>) -> Self {
        ZapParseError::InvalidGiftContent(reason.into())
    }
}
