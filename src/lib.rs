//! Gift Zap Processor - Gift subscriptions paid with Lightning zaps
//!
//! This crate watches Nostr relays for zap receipts addressed to the service
//! identity, validates the payment against the tier price at the current BTC
//! rate, extends the recipient's subscription exactly once per receipt, and
//! publishes a signed confirmation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
