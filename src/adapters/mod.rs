//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-memory account and processed-zap stores
//! - `postgres` - PostgreSQL account and processed-zap stores
//! - `price` - HTTP spot price feed
//! - `relay` - WebSocket relay subscription and publishing
//! - `signing` - Schnorr event signing
//! - `notify` - Plain zap forwarding

pub mod memory;
pub mod notify;
pub mod postgres;
pub mod price;
pub mod relay;
pub mod signing;
