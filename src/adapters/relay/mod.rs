//! Relay adapters - WebSocket subscription and publishing.

mod backoff;
mod errors;
mod messages;
mod subscription_manager;
mod watchlist;
mod websocket_publisher;

pub use backoff::ExponentialBackoff;
pub use errors::RelayError;
pub use messages::{ClientMessage, RelayMessage, SubscriptionFilter};
pub use subscription_manager::{RelaySubscriptionConfig, RelaySubscriptionManager};
pub use watchlist::{apply_watchlist_updates, WatchlistUpdates};
pub use websocket_publisher::WebSocketRelayPublisher;
