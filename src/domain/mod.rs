//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `subscription` - Tiers, entitlements, and account subscription state
//! - `zap` - Relay event model, receipt parsing, gift payloads
//! - `pricing` - Tier prices and the cached BTC rate
//! - `gift` - Payment validation and the subscription ledger

pub mod foundation;
pub mod gift;
pub mod pricing;
pub mod subscription;
pub mod zap;
