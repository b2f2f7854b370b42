//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The relay subscription drives it: each delivered event goes through
//! `ProcessZapReceiptHandler`.

pub mod handlers;

pub use handlers::{
    NotificationPublisher, ProcessZapReceiptHandler, PublishSummary, ZapOutcome, GIFT_TOPIC,
};
