//! Zap handlers - gift zap processing and confirmation publishing.

mod process_zap_receipt;
mod publish_confirmation;

pub use process_zap_receipt::{ProcessZapReceiptHandler, ZapOutcome};
pub use publish_confirmation::{NotificationPublisher, PublishSummary, GIFT_TOPIC};
