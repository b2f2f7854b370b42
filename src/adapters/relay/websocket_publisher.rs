//! WebSocket relay publisher.
//!
//! Opens a short-lived connection per relay, sends `EVENT`, and waits for the
//! matching `OK`. Each relay has its own timeout and no retry.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::domain::zap::NostrEvent;
use crate::ports::{RelayPublishResult, RelayPublisher};

use super::{ClientMessage, RelayError, RelayMessage};

/// Publishes events over fresh WebSocket connections.
#[derive(Debug, Clone)]
pub struct WebSocketRelayPublisher {
    timeout: Duration,
}

impl WebSocketRelayPublisher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn publish_one(&self, url: &str, event: &NostrEvent) -> RelayPublishResult {
        match tokio::time::timeout(self.timeout, send_event(url, event)).await {
            Ok(Ok(())) => RelayPublishResult::accepted(url),
            Ok(Err(e)) => RelayPublishResult::rejected(url, e.to_string()),
            Err(_) => RelayPublishResult::rejected(url, RelayError::Timeout(self.timeout).to_string()),
        }
    }
}

impl Default for WebSocketRelayPublisher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

async fn send_event(url: &str, event: &NostrEvent) -> Result<(), RelayError> {
    let (ws, _) = connect_async(url).await?;
    let (mut sink, mut stream) = ws.split();

    sink.send(Message::Text(ClientMessage::Event(event.clone()).to_json()))
        .await?;

    let outcome = loop {
        match stream.next().await {
            None => break Err(RelayError::Closed),
            Some(Err(e)) => break Err(e.into()),
            Some(Ok(Message::Text(text))) => match RelayMessage::parse(&text) {
                Ok(RelayMessage::Ok {
                    event_id,
                    accepted,
                    message,
                }) if event_id == event.id => {
                    break if accepted {
                        Ok(())
                    } else {
                        Err(RelayError::Rejected(message))
                    };
                }
                Ok(RelayMessage::Notice(notice)) => {
                    tracing::debug!(relay = %url, notice = %notice, "Relay notice during publish");
                }
                _ => {}
            },
            Some(Ok(Message::Close(_))) => break Err(RelayError::Closed),
            Some(Ok(_)) => {}
        }
    };

    let _ = sink.close().await;
    outcome
}

#[async_trait]
impl RelayPublisher for WebSocketRelayPublisher {
    async fn publish(&self, relay_urls: &[String], event: &NostrEvent) -> Vec<RelayPublishResult> {
        join_all(relay_urls.iter().map(|url| self.publish_one(url, event))).await
    }
}
