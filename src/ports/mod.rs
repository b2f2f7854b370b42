//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `AccountRepository` - Account subscription state (external collaborator)
//! - `ProcessedZapStore` - Gift zap idempotency and audit trail
//!
//! ## Network Ports
//!
//! - `PriceFeed` - Spot USD/BTC rate
//! - `RelayPublisher` - Broadcast signed events
//! - `RelayEventHandler` - Callback for subscribed relay events
//! - `PlainZapSink` - Non-gift zaps handed to notification delivery
//! - `AccountWatcher` - Extends the relay watch-list with new accounts
//!
//! ## Identity
//!
//! - `EventSigner` - Signs confirmation events with the service key

mod account_repository;
mod account_watcher;
mod event_signer;
mod plain_zap_sink;
mod price_feed;
mod processed_zap_store;
mod relay_event_handler;
mod relay_publisher;

pub use account_repository::AccountRepository;
pub use account_watcher::AccountWatcher;
pub use event_signer::{EventSigner, SigningError};
pub use plain_zap_sink::PlainZapSink;
pub use price_feed::PriceFeed;
pub use processed_zap_store::{ClaimResult, ProcessedZapStore, SaveResult};
pub use relay_event_handler::RelayEventHandler;
pub use relay_publisher::{RelayPublishResult, RelayPublisher};
