//! Application handlers.
//!
//! Handlers that orchestrate domain operations for relay-delivered events.

pub mod zap;

pub use zap::{
    NotificationPublisher, ProcessZapReceiptHandler, PublishSummary, ZapOutcome, GIFT_TOPIC,
};
