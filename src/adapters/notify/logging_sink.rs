//! Plain zap sink that only logs.
//!
//! Push delivery lives in the wider service. Until it is wired in, plain zaps
//! are logged so operators can see traffic.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::zap::ZapReceipt;
use crate::ports::PlainZapSink;

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPlainZapSink;

#[async_trait]
impl PlainZapSink for LoggingPlainZapSink {
    async fn forward(&self, receipt: &ZapReceipt) -> Result<(), DomainError> {
        tracing::info!(
            event_id = %receipt.id(),
            sender = %receipt.sender(),
            recipients = ?receipt.recipient_pubkeys(),
            amount_msats = receipt.amount_msats(),
            "Plain zap received"
        );
        Ok(())
    }
}
