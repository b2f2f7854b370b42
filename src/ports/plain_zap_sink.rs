//! Plain zap sink port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::zap::ZapReceipt;

/// Receives zaps that are not gifts, for ordinary notification delivery.
#[async_trait]
pub trait PlainZapSink: Send + Sync {
    async fn forward(&self, receipt: &ZapReceipt) -> Result<(), DomainError>;
}
