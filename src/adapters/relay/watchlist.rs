//! Watch-list growth for accounts created while the service runs.
//!
//! The zap handler is built before the subscription manager that owns it,
//! so new pubkeys travel over a channel to a task holding the manager.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::foundation::PublicKey;
use crate::ports::AccountWatcher;

use super::RelaySubscriptionManager;

/// Sending half of the watch-list channel.
#[derive(Clone)]
pub struct WatchlistUpdates {
    tx: mpsc::UnboundedSender<PublicKey>,
}

impl WatchlistUpdates {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PublicKey>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl AccountWatcher for WatchlistUpdates {
    async fn watch(&self, pubkey: &PublicKey) {
        if self.tx.send(pubkey.clone()).is_err() {
            tracing::warn!(pubkey = %pubkey.short(), "Watch-list updates are no longer applied");
        }
    }
}

/// Adds each received pubkey to `manager`'s watch-list until every
/// sender is dropped.
///
/// Pubkeys queued together are applied in one update. Keys already in
/// the list are skipped.
pub async fn apply_watchlist_updates(
    manager: Arc<RelaySubscriptionManager>,
    initial: Vec<PublicKey>,
    mut updates: mpsc::UnboundedReceiver<PublicKey>,
) {
    let mut watched: BTreeSet<PublicKey> = initial.into_iter().collect();

    while let Some(pubkey) = updates.recv().await {
        let mut added = watched.insert(pubkey);
        while let Ok(pubkey) = updates.try_recv() {
            added |= watched.insert(pubkey);
        }
        if !added {
            continue;
        }

        let list: Vec<PublicKey> = watched.iter().cloned().collect();
        if let Err(e) = manager.update_watchlist(&list).await {
            tracing::warn!(watched = list.len(), error = %e, "Failed to extend watch-list");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::relay::RelaySubscriptionConfig;
    use crate::domain::zap::NostrEvent;
    use crate::ports::RelayEventHandler;

    struct NoopHandler;

    #[async_trait]
    impl RelayEventHandler for NoopHandler {
        async fn on_event(&self, _relay_url: &str, _event: NostrEvent) {}
    }

    fn key(hex: &str) -> PublicKey {
        PublicKey::parse(&hex.repeat(32)).unwrap()
    }

    #[tokio::test]
    async fn watcher_queues_pubkeys() {
        let (updates, mut rx) = WatchlistUpdates::channel();

        updates.watch(&key("aa")).await;

        assert_eq!(rx.recv().await, Some(key("aa")));
    }

    #[tokio::test]
    async fn watcher_survives_closed_channel() {
        let (updates, rx) = WatchlistUpdates::channel();
        drop(rx);

        updates.watch(&key("aa")).await;
    }

    #[tokio::test]
    async fn applier_ends_when_senders_drop_even_if_manager_is_stopped() {
        let manager = Arc::new(RelaySubscriptionManager::new(
            RelaySubscriptionConfig::new(vec![], key("5e"), 0),
            Arc::new(NoopHandler),
        ));
        let (updates, rx) = WatchlistUpdates::channel();

        updates.watch(&key("aa")).await;
        drop(updates);

        apply_watchlist_updates(manager.clone(), vec![], rx).await;
        assert!(!manager.is_running().await);
    }
}
