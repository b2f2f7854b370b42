//! Processed zap audit record.
//!
//! At most one record exists per receipt id. Records are created once and
//! never updated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, PublicKey, Timestamp, ValidationError};
use crate::domain::subscription::SubscriptionTier;
use crate::domain::zap::{GiftPayload, ZapReceipt};

/// Terminal classification of a gift zap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZapStatus {
    /// Payment accepted and subscription applied.
    Success,
    /// Payment below tolerance. Held for manual review.
    Underpaid,
    /// Payment accepted but the account store failed.
    Failed,
}

impl ZapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZapStatus::Success => "success",
            ZapStatus::Underpaid => "underpaid",
            ZapStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ZapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZapStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ZapStatus::Success),
            "underpaid" => Ok(ZapStatus::Underpaid),
            "failed" => Ok(ZapStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown zap status '{}'", other),
            )),
        }
    }
}

/// Audit row for a gift zap that reached payment validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedZapRecord {
    /// Receipt event id. Unique.
    pub event_id: EventId,
    pub recipient_pubkey: PublicKey,
    /// Sender public key from the zap request.
    pub gifted_by: String,
    pub tier: SubscriptionTier,
    pub months: u8,
    pub amount_sats: u64,
    pub status: ZapStatus,
    pub error_message: Option<String>,
    pub processed_at: Timestamp,
}

impl ProcessedZapRecord {
    fn from_zap(
        receipt: &ZapReceipt,
        gift: &GiftPayload,
        status: ZapStatus,
        error_message: Option<String>,
    ) -> Self {
        Self {
            event_id: receipt.id(),
            recipient_pubkey: gift.recipient.clone(),
            gifted_by: receipt.sender().to_string(),
            tier: gift.tier,
            months: gift.months,
            amount_sats: receipt.amount_msats() / 1000,
            status,
            error_message,
            processed_at: Timestamp::now(),
        }
    }

    /// Record for an applied gift.
    pub fn success(receipt: &ZapReceipt, gift: &GiftPayload) -> Self {
        Self::from_zap(receipt, gift, ZapStatus::Success, None)
    }

    /// Record for an underpaid gift, with the shortfall explanation.
    pub fn underpaid(receipt: &ZapReceipt, gift: &GiftPayload, message: impl Into<String>) -> Self {
        Self::from_zap(receipt, gift, ZapStatus::Underpaid, Some(message.into()))
    }

    /// Record for a gift whose activation failed.
    pub fn failed(receipt: &ZapReceipt, gift: &GiftPayload, error: impl Into<String>) -> Self {
        Self::from_zap(receipt, gift, ZapStatus::Failed, Some(error.into()))
    }
}
