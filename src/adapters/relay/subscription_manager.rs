//! Relay subscription manager.
//!
//! Keeps one task per relay. Each task connects, issues a `REQ` for zap
//! receipts tagging the service identity or any watched user, and hands every
//! received event to the handler on its own task. Relays fail independently.
//!
//! Handler tasks are owned by the relay task that spawned them. On shutdown a
//! relay task closes its subscription and then waits for its in-flight
//! handlers, so `stop()` returns only after every received event is handled.
//!
//! ## Reconnect policy
//!
//! - Connect attempts time out after `connect_timeout`
//! - Failed or dropped connections back off exponentially from
//!   `reconnect_initial_delay` to `reconnect_max_delay`, resetting after each
//!   successful connect
//! - A resubscription asks for events since the newest one seen on that relay
//!   minus `resubscribe_overlap`, never earlier than the configured floor.
//!   Redelivered events are absorbed by the ledger.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;
use uuid::Uuid;

use crate::domain::foundation::PublicKey;
use crate::domain::zap::ZAP_RECEIPT_KIND;
use crate::ports::RelayEventHandler;

use super::{ClientMessage, ExponentialBackoff, RelayError, RelayMessage, SubscriptionFilter};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Settings for relay subscriptions.
#[derive(Debug, Clone)]
pub struct RelaySubscriptionConfig {
    pub relay_urls: Vec<String>,
    /// Always included in the `#p` filter.
    pub service_pubkey: PublicKey,
    /// Unix seconds; nothing older is ever requested.
    pub since_floor: u64,
    pub connect_timeout: Duration,
    pub reconnect_initial_delay: Duration,
    pub reconnect_max_delay: Duration,
    /// Watch-lists longer than this log a warning.
    pub max_watched_pubkeys: usize,
    pub resubscribe_overlap: Duration,
}

impl RelaySubscriptionConfig {
    pub fn new(relay_urls: Vec<String>, service_pubkey: PublicKey, since_floor: u64) -> Self {
        Self {
            relay_urls,
            service_pubkey,
            since_floor,
            connect_timeout: Duration::from_secs(10),
            reconnect_initial_delay: Duration::from_secs(1),
            reconnect_max_delay: Duration::from_secs(60),
            max_watched_pubkeys: 2000,
            resubscribe_overlap: Duration::from_secs(60),
        }
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    watchlist: watch::Sender<Arc<Vec<String>>>,
    tasks: Vec<JoinHandle<()>>,
}

/// Maintains live zap receipt subscriptions across relays.
pub struct RelaySubscriptionManager {
    config: RelaySubscriptionConfig,
    handler: Arc<dyn RelayEventHandler>,
    running: Mutex<Option<Running>>,
}

impl RelaySubscriptionManager {
    pub fn new(config: RelaySubscriptionConfig, handler: Arc<dyn RelayEventHandler>) -> Self {
        Self {
            config,
            handler,
            running: Mutex::new(None),
        }
    }

    /// Opens a subscription on every configured relay.
    ///
    /// Invalid relay URLs are logged and skipped.
    pub async fn start(&self, watched: &[PublicKey]) -> Result<(), RelayError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(RelayError::AlreadyStarted);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (watch_tx, watch_rx) = watch::channel(self.tag_set(watched));

        let mut tasks = Vec::new();
        for url in &self.config.relay_urls {
            if let Err(e) = Url::parse(url) {
                tracing::warn!(relay = %url, error = %e, "Skipping invalid relay URL");
                continue;
            }
            let worker = RelayWorker {
                url: url.clone(),
                config: self.config.clone(),
                handler: self.handler.clone(),
                shutdown: shutdown_rx.clone(),
                watchlist: watch_rx.clone(),
                newest_seen: None,
                in_flight: JoinSet::new(),
            };
            tasks.push(tokio::spawn(worker.run()));
        }

        tracing::info!(
            relays = tasks.len(),
            watched = watched.len(),
            since = self.config.since_floor,
            "Relay subscriptions started"
        );

        *running = Some(Running {
            shutdown: shutdown_tx,
            watchlist: watch_tx,
            tasks,
        });
        Ok(())
    }

    /// Replaces the watched set and re-issues the subscription on live connections.
    pub async fn update_watchlist(&self, watched: &[PublicKey]) -> Result<(), RelayError> {
        let running = self.running.lock().await;
        let running = running.as_ref().ok_or(RelayError::NotRunning)?;
        running.watchlist.send_replace(self.tag_set(watched));
        tracing::info!(watched = watched.len(), "Relay watch-list updated");
        Ok(())
    }

    /// Closes all connections and waits for relay tasks and the event
    /// handlers they started to finish.
    ///
    /// Safe to call more than once.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            return;
        };

        let _ = running.shutdown.send(true);
        for task in running.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Relay task ended abnormally");
            }
        }
        tracing::info!("Relay subscriptions stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    fn tag_set(&self, watched: &[PublicKey]) -> Arc<Vec<String>> {
        if watched.len() > self.config.max_watched_pubkeys {
            tracing::warn!(
                watched = watched.len(),
                limit = self.config.max_watched_pubkeys,
                "Watch-list is very large; relays may truncate or reject the filter"
            );
        }

        let tags: BTreeSet<String> = std::iter::once(&self.config.service_pubkey)
            .chain(watched.iter())
            .map(|p| p.as_str().to_string())
            .collect();
        Arc::new(tags.into_iter().collect())
    }
}

/// How a connected session ended.
enum SessionEnd {
    Shutdown,
    Disconnected(String),
}

struct RelayWorker {
    url: String,
    config: RelaySubscriptionConfig,
    handler: Arc<dyn RelayEventHandler>,
    shutdown: watch::Receiver<bool>,
    watchlist: watch::Receiver<Arc<Vec<String>>>,
    newest_seen: Option<u64>,
    in_flight: JoinSet<()>,
}

impl RelayWorker {
    async fn run(mut self) {
        let mut backoff =
            ExponentialBackoff::new(self.config.reconnect_initial_delay, self.config.reconnect_max_delay);

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let connect = tokio::time::timeout(self.config.connect_timeout, connect_async(self.url.as_str()));
            let connected = tokio::select! {
                _ = self.shutdown.changed() => break,
                result = connect => result,
            };

            match connected {
                Ok(Ok((ws, _))) => {
                    backoff.reset();
                    tracing::info!(relay = %self.url, "Relay connected");
                    match self.session(ws).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Disconnected(reason) => {
                            tracing::warn!(relay = %self.url, reason = %reason, "Relay disconnected");
                        }
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(relay = %self.url, error = %RelayError::from(e), "Relay connect failed");
                }
                Err(_) => {
                    tracing::warn!(
                        relay = %self.url,
                        timeout_secs = self.config.connect_timeout.as_secs(),
                        "Relay connect timed out"
                    );
                }
            }

            let delay = backoff.next_delay();
            tracing::debug!(relay = %self.url, delay_ms = delay.as_millis() as u64, "Reconnecting after delay");
            tokio::select! {
                _ = self.shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if !self.in_flight.is_empty() {
            tracing::info!(
                relay = %self.url,
                pending = self.in_flight.len(),
                "Waiting for in-flight events"
            );
        }
        while let Some(joined) = self.in_flight.join_next().await {
            self.reap(joined);
        }

        tracing::debug!(relay = %self.url, "Relay task exiting");
    }

    fn reap(&self, joined: Result<(), JoinError>) {
        if let Err(e) = joined {
            tracing::error!(relay = %self.url, error = %e, "Event handler task failed");
        }
    }

    fn filter(&self, p_tags: &[String]) -> SubscriptionFilter {
        let overlap = self.config.resubscribe_overlap.as_secs();
        let since = self
            .newest_seen
            .map(|newest| newest.saturating_sub(overlap).max(self.config.since_floor))
            .unwrap_or(self.config.since_floor);

        SubscriptionFilter {
            kinds: vec![ZAP_RECEIPT_KIND],
            p_tags: p_tags.to_vec(),
            since: Some(since),
        }
    }

    fn req(&mut self, subscription_id: &str) -> Message {
        let tags = self.watchlist.borrow_and_update().clone();
        let msg = ClientMessage::Req {
            subscription_id: subscription_id.to_string(),
            filter: self.filter(&tags),
        };
        Message::Text(msg.to_json())
    }

    async fn session(&mut self, ws: WsStream) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();
        let subscription_id = format!("gift-zaps-{}", Uuid::new_v4().simple());

        if let Err(e) = sink.send(self.req(&subscription_id)).await {
            return SessionEnd::Disconnected(format!("failed to subscribe: {}", e));
        }

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    let close = ClientMessage::Close { subscription_id: subscription_id.clone() };
                    let _ = sink.send(Message::Text(close.to_json())).await;
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }
                changed = self.watchlist.changed() => {
                    if changed.is_err() {
                        return SessionEnd::Shutdown;
                    }
                    // Same id replaces the subscription on the relay.
                    if let Err(e) = sink.send(self.req(&subscription_id)).await {
                        return SessionEnd::Disconnected(format!("failed to resubscribe: {}", e));
                    }
                    tracing::debug!(relay = %self.url, "Subscription re-issued with new watch-list");
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.reap(joined);
                }
                frame = stream.next() => {
                    let text = match frame {
                        None => return SessionEnd::Disconnected("stream ended".to_string()),
                        Some(Err(e)) => return SessionEnd::Disconnected(RelayError::from(e).to_string()),
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) => {
                            return SessionEnd::Disconnected("closed by relay".to_string())
                        }
                        Some(Ok(_)) => continue,
                    };

                    match RelayMessage::parse(&text) {
                        Ok(RelayMessage::Event { subscription_id: sub, event }) if sub == subscription_id => {
                            self.newest_seen = Some(
                                self.newest_seen.map_or(event.created_at, |n| n.max(event.created_at)),
                            );
                            let handler = self.handler.clone();
                            let url = self.url.clone();
                            self.in_flight.spawn(async move {
                                handler.on_event(&url, event).await;
                            });
                        }
                        Ok(RelayMessage::Eose { .. }) => {
                            tracing::debug!(relay = %self.url, "End of stored events");
                        }
                        Ok(RelayMessage::Notice(notice)) => {
                            tracing::info!(relay = %self.url, notice = %notice, "Relay notice");
                        }
                        Ok(RelayMessage::Closed { message, .. }) => {
                            return SessionEnd::Disconnected(format!("subscription closed: {}", message));
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::debug!(relay = %self.url, error = %e, "Ignoring unparseable relay message");
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zap::NostrEvent;
    use async_trait::async_trait;

    struct NoopHandler;

    #[async_trait]
    impl RelayEventHandler for NoopHandler {
        async fn on_event(&self, _relay_url: &str, _event: NostrEvent) {}
    }

    fn key(byte: &str) -> PublicKey {
        PublicKey::parse(&byte.repeat(32)).unwrap()
    }

    fn manager() -> RelaySubscriptionManager {
        let config = RelaySubscriptionConfig::new(vec![], key("ff"), 1_700_000_000);
        RelaySubscriptionManager::new(config, Arc::new(NoopHandler))
    }

    fn worker(newest_seen: Option<u64>) -> RelayWorker {
        let (_, shutdown) = watch::channel(false);
        let (_, watchlist) = watch::channel(Arc::new(vec![]));
        RelayWorker {
            url: "ws://relay".into(),
            config: RelaySubscriptionConfig::new(vec![], key("ff"), 1_000),
            handler: Arc::new(NoopHandler),
            shutdown,
            watchlist,
            newest_seen,
            in_flight: JoinSet::new(),
        }
    }

    #[test]
    fn tag_set_includes_service_and_dedups() {
        let tags = manager().tag_set(&[key("aa"), key("aa"), key("ff")]);
        assert_eq!(tags.as_slice(), &["aa".repeat(32), "ff".repeat(32)]);
    }

    #[test]
    fn first_subscription_uses_floor() {
        let filter = worker(None).filter(&["aa".into()]);
        assert_eq!(filter.since, Some(1_000));
        assert_eq!(filter.kinds, vec![ZAP_RECEIPT_KIND]);
        assert_eq!(filter.p_tags, vec!["aa".to_string()]);
    }

    #[test]
    fn resubscription_overlaps_newest_seen() {
        assert_eq!(worker(Some(5_000)).filter(&[]).since, Some(4_940));
        // Never earlier than the floor.
        assert_eq!(worker(Some(1_030)).filter(&[]).since, Some(1_000));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let manager = manager();
        manager.stop().await;
        manager.start(&[]).await.unwrap();
        assert!(manager.is_running().await);
        manager.stop().await;
        manager.stop().await;
        assert!(!manager.is_running().await);
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let manager = manager();
        manager.start(&[]).await.unwrap();
        assert_eq!(manager.start(&[]).await, Err(RelayError::AlreadyStarted));
        manager.stop().await;
    }

    #[tokio::test]
    async fn watchlist_update_requires_running() {
        let manager = manager();
        assert_eq!(
            manager.update_watchlist(&[key("aa")]).await,
            Err(RelayError::NotRunning)
        );
    }
}
