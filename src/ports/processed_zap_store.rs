//! ProcessedZapStore port - idempotency tracking for gift zaps.
//!
//! The same receipt reaches us once per relay that carries it, and relays
//! redeliver after reconnects. All gift handling MUST be idempotent.
//!
//! ## Claim vs. record
//!
//! - `claim` is an atomic insert-if-absent on the receipt id and is the only
//!   mutual-exclusion primitive in the pipeline. Exactly one caller gets
//!   `Claimed` for a given id.
//! - `insert_once` stores the terminal audit record. It never overwrites.
//!
//! Implementations must enforce both with a uniqueness guarantee
//! (PRIMARY KEY + `ON CONFLICT DO NOTHING`, or a lock-guarded set).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId};
use crate::domain::gift::ProcessedZapRecord;

/// Result of claiming a receipt id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// This caller owns the receipt and must record an outcome.
    Claimed,
    /// Another delivery already claimed it.
    AlreadyClaimed,
}

/// Result of attempting to save a processed zap record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted.
    Inserted,
    /// A record for this receipt already exists.
    AlreadyExists,
}

/// Port for the processed-zap audit trail.
#[async_trait]
pub trait ProcessedZapStore: Send + Sync {
    /// True when a claim or a record exists for `event_id`.
    async fn exists(&self, event_id: &EventId) -> Result<bool, DomainError>;

    /// Atomically claim `event_id`.
    async fn claim(&self, event_id: &EventId) -> Result<ClaimResult, DomainError>;

    /// Insert the record unless one already exists for its event id.
    async fn insert_once(&self, record: ProcessedZapRecord) -> Result<SaveResult, DomainError>;
}
