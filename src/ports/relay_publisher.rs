//! Relay publisher port.

use async_trait::async_trait;

use crate::domain::zap::NostrEvent;

/// Outcome of publishing to a single relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayPublishResult {
    pub relay_url: String,
    /// `Ok` if the relay accepted the event, otherwise the reason.
    pub outcome: Result<(), String>,
}

impl RelayPublishResult {
    pub fn accepted(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            outcome: Ok(()),
        }
    }

    pub fn rejected(relay_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            outcome: Err(reason.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Publishes signed events to relays.
///
/// Implementations publish to every relay concurrently and report each
/// outcome. They never fail as a whole.
#[async_trait]
pub trait RelayPublisher: Send + Sync {
    async fn publish(&self, relay_urls: &[String], event: &NostrEvent) -> Vec<RelayPublishResult>;
}
