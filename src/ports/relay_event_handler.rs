//! Relay event handler port.

use async_trait::async_trait;

use crate::domain::zap::NostrEvent;

/// Callback invoked for every event received on a relay subscription.
///
/// The same event may arrive once per relay; implementations must tolerate
/// duplicates. Handlers are invoked concurrently and must not fail the
/// subscription, so there is no error return.
#[async_trait]
pub trait RelayEventHandler: Send + Sync {
    async fn on_event(&self, relay_url: &str, event: NostrEvent);
}
