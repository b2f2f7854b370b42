//! Relay configuration

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;
use super::split_list;

/// Relay subscription and publishing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelaysConfig {
    /// Relays to subscribe to for zap receipts (comma-separated)
    #[serde(default)]
    pub subscribe_urls: String,

    /// Operator relays that always receive confirmations (comma-separated).
    /// Falls back to the subscribe list when unset.
    pub publish_urls: Option<String>,

    /// WebSocket connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-relay publish timeout in seconds
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_secs: u64,

    /// First reconnect delay in milliseconds
    #[serde(default = "default_reconnect_initial_delay")]
    pub reconnect_initial_delay_ms: u64,

    /// Reconnect delay cap in milliseconds
    #[serde(default = "default_reconnect_max_delay")]
    pub reconnect_max_delay_ms: u64,

    /// Watch-list size above which a warning is logged
    #[serde(default = "default_max_watched_pubkeys")]
    pub max_watched_pubkeys: usize,

    /// Earliest receipt timestamp to request (unix seconds)
    #[serde(default)]
    pub since_floor: u64,
}

impl RelaysConfig {
    pub fn subscribe_list(&self) -> Vec<String> {
        split_list(&self.subscribe_urls)
    }

    pub fn publish_list(&self) -> Vec<String> {
        match self.publish_urls.as_deref().map(split_list) {
            Some(list) if !list.is_empty() => list,
            _ => self.subscribe_list(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub fn reconnect_initial_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_delay_ms)
    }

    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_delay_ms)
    }

    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let subscribe = self.subscribe_list();
        if subscribe.is_empty() {
            return Err(ValidationError::MissingRequired("RELAYS__SUBSCRIBE_URLS"));
        }
        for url in subscribe.iter().chain(self.publish_list().iter()) {
            validate_relay_url(url)?;
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("connect_timeout_secs"));
        }
        if self.publish_timeout_secs == 0 || self.publish_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("publish_timeout_secs"));
        }
        if self.reconnect_initial_delay_ms == 0
            || self.reconnect_initial_delay_ms > self.reconnect_max_delay_ms
        {
            return Err(ValidationError::InvalidBackoff);
        }
        Ok(())
    }
}

fn validate_relay_url(url: &str) -> Result<(), ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "ws" | "wss") => Ok(()),
        _ => Err(ValidationError::InvalidRelayUrl(url.to_string())),
    }
}

impl Default for RelaysConfig {
    fn default() -> Self {
        Self {
            subscribe_urls: String::new(),
            publish_urls: None,
            connect_timeout_secs: default_connect_timeout(),
            publish_timeout_secs: default_publish_timeout(),
            reconnect_initial_delay_ms: default_reconnect_initial_delay(),
            reconnect_max_delay_ms: default_reconnect_max_delay(),
            max_watched_pubkeys: default_max_watched_pubkeys(),
            since_floor: 0,
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_publish_timeout() -> u64 {
    10
}

fn default_reconnect_initial_delay() -> u64 {
    1000
}

fn default_reconnect_max_delay() -> u64 {
    60_000
}

fn default_max_watched_pubkeys() -> usize {
    2000
}
