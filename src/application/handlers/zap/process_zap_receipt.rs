//! ProcessZapReceiptHandler - Entry point for every subscribed zap receipt.
//!
//! Parses the event, forwards plain zaps, and for gift zaps runs the
//! validate, claim, activate, record sequence before publishing a confirmation.
//!
//! The claim is taken after price validation and before any account change.
//! A deferred event (no price, store outage) holds no claim, so the next
//! delivery of the same receipt is processed from scratch.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{PublicKey, Timestamp};
use crate::domain::gift::{
    GiftError, PaymentDecision, PaymentValidator, ProcessedZapRecord, SubscriptionLedger,
};
use crate::domain::subscription::{GiftTransition, SubscriptionTier};
use crate::domain::zap::{
    GiftPayload, NostrEvent, ParsedZap, ZapEventParser, ZapParseError, ZapReceipt,
};
use crate::ports::{AccountWatcher, ClaimResult, PlainZapSink, RelayEventHandler};

use super::{NotificationPublisher, PublishSummary};

/// What happened to one receipt.
#[derive(Debug, Clone, PartialEq)]
pub enum ZapOutcome {
    /// Not a usable receipt. Nothing recorded.
    Dropped { reason: String },
    /// Non-gift zap handed to notification delivery.
    PlainZapForwarded,
    /// Receipt already claimed by an earlier delivery.
    AlreadyProcessed,
    /// Gift applied and recorded as success.
    Activated {
        recipient: PublicKey,
        tier: SubscriptionTier,
        expires_at: Option<Timestamp>,
        transition: GiftTransition,
        confirmation: PublishSummary,
    },
    /// Payment short. Recorded, no account change.
    Underpaid { message: String },
    /// Account store failed after the claim. Recorded as failed.
    ActivationFailed { error: String },
    /// Could not decide now. No claim held; a redelivery will retry.
    Deferred { reason: String },
}

/// Processes zap receipts delivered by relay subscriptions.
pub struct ProcessZapReceiptHandler {
    parser: ZapEventParser,
    validator: Arc<PaymentValidator>,
    ledger: SubscriptionLedger,
    notifier: Arc<NotificationPublisher>,
    plain_sink: Arc<dyn PlainZapSink>,
    watcher: Option<Arc<dyn AccountWatcher>>,
}

impl ProcessZapReceiptHandler {
    pub fn new(
        parser: ZapEventParser,
        validator: Arc<PaymentValidator>,
        ledger: SubscriptionLedger,
        notifier: Arc<NotificationPublisher>,
        plain_sink: Arc<dyn PlainZapSink>,
    ) -> Self {
        Self {
            parser,
            validator,
            ledger,
            notifier,
            plain_sink,
            watcher: None,
        }
    }

    /// Reports accounts created by a gift to `watcher`.
    pub fn with_account_watcher(mut self, watcher: Arc<dyn AccountWatcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub async fn handle(&self, event: NostrEvent) -> ZapOutcome {
        let event_id = event.id.clone();
        match self.parser.parse(event) {
            Ok(ParsedZap::Gift { receipt, gift }) => self.handle_gift(receipt, gift).await,
            Ok(ParsedZap::Plain { receipt }) => self.forward_plain(receipt).await,
            Err(ZapParseError::NotAReceipt(kind)) => {
                tracing::debug!(event_id = %event_id, kind, "Ignoring non-receipt event");
                ZapOutcome::Dropped {
                    reason: ZapParseError::NotAReceipt(kind).to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(event_id = %event_id, error = %e, "Dropping zap receipt");
                ZapOutcome::Dropped {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn forward_plain(&self, receipt: ZapReceipt) -> ZapOutcome {
        if let Err(e) = self.plain_sink.forward(&receipt).await {
            tracing::warn!(event_id = %receipt.id(), error = %e, "Plain zap forwarding failed");
        }
        ZapOutcome::PlainZapForwarded
    }

    async fn handle_gift(&self, receipt: ZapReceipt, gift: GiftPayload) -> ZapOutcome {
        let event_id = receipt.id();

        match self.ledger.is_processed(&event_id).await {
            Ok(true) => {
                tracing::debug!(event_id = %event_id, "Gift zap already processed");
                return ZapOutcome::AlreadyProcessed;
            }
            Ok(false) => {}
            Err(e) => return deferred(&receipt, e),
        }

        let decision = self
            .validator
            .validate(gift.tier, gift.months, receipt.amount_msats())
            .await;
        if let PaymentDecision::PriceUnavailable { message } = decision {
            tracing::warn!(event_id = %event_id, reason = %message, "Deferring gift zap");
            return ZapOutcome::Deferred { reason: message };
        }

        match self.ledger.claim(&event_id).await {
            Ok(ClaimResult::Claimed) => {}
            Ok(ClaimResult::AlreadyClaimed) => {
                tracing::debug!(event_id = %event_id, "Gift zap claimed by a concurrent delivery");
                return ZapOutcome::AlreadyProcessed;
            }
            Err(e) => return deferred(&receipt, e),
        }

        match decision {
            PaymentDecision::Accepted {
                amount_sats,
                estimated_cents,
            } => {
                tracing::info!(
                    event_id = %event_id,
                    recipient = %gift.recipient.short(),
                    tier = %gift.tier,
                    months = gift.months,
                    amount_sats,
                    estimated_cents,
                    "Gift payment accepted"
                );
                self.activate(receipt, gift).await
            }
            PaymentDecision::Underpaid { message, .. } => {
                tracing::warn!(
                    event_id = %event_id,
                    recipient = %gift.recipient.short(),
                    reason = %message,
                    "Gift zap underpaid"
                );
                self.record(ProcessedZapRecord::underpaid(&receipt, &gift, message.clone()))
                    .await;
                ZapOutcome::Underpaid { message }
            }
            PaymentDecision::PriceUnavailable { message } => ZapOutcome::Deferred { reason: message },
        }
    }

    async fn activate(&self, receipt: ZapReceipt, gift: GiftPayload) -> ZapOutcome {
        let event_id = receipt.id();
        match self
            .ledger
            .apply_gift(&gift.recipient, gift.tier, gift.months)
            .await
        {
            Ok(activation) => {
                self.record(ProcessedZapRecord::success(&receipt, &gift)).await;
                tracing::info!(
                    event_id = %event_id,
                    recipient = %gift.recipient.short(),
                    tier = %activation.account.tier,
                    expires_at = ?activation.account.expires_at.map(|t| t.to_string()),
                    transition = ?activation.transition,
                    "Gift subscription activated"
                );
                if let (GiftTransition::Created, Some(watcher)) =
                    (activation.transition, &self.watcher)
                {
                    watcher.watch(&gift.recipient).await;
                }
                let confirmation = self.notifier.publish(&receipt, &gift).await;
                ZapOutcome::Activated {
                    recipient: gift.recipient,
                    tier: activation.account.tier,
                    expires_at: activation.account.expires_at,
                    transition: activation.transition,
                    confirmation,
                }
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event_id,
                    recipient = %gift.recipient.short(),
                    error = %e,
                    "Gift activation failed"
                );
                self.record(ProcessedZapRecord::failed(&receipt, &gift, e.to_string()))
                    .await;
                ZapOutcome::ActivationFailed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Writes the audit record. The claim already guards against reprocessing,
    /// so a failed write is logged and processing continues.
    async fn record(&self, record: ProcessedZapRecord) {
        let event_id = record.event_id.clone();
        let status = record.status;
        if let Err(e) = self.ledger.record_outcome(record).await {
            tracing::error!(
                event_id = %event_id,
                status = %status,
                error = %e,
                "Failed to write processed zap record"
            );
        }
    }
}

fn deferred(receipt: &ZapReceipt, error: GiftError) -> ZapOutcome {
    tracing::error!(event_id = %receipt.id(), error = %error, "Deferring gift zap");
    ZapOutcome::Deferred {
        reason: error.to_string(),
    }
}

#[async_trait]
impl RelayEventHandler for ProcessZapReceiptHandler {
    async fn on_event(&self, relay_url: &str, event: NostrEvent) {
        let event_id = event.id.clone();
        let outcome = self.handle(event).await;
        tracing::debug!(relay = %relay_url, event_id = %event_id, outcome = ?outcome, "Zap receipt handled");
    }
}
