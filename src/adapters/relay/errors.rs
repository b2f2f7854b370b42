//! Relay transport errors.

use std::time::Duration;

use thiserror::Error;

/// Errors from relay connections and protocol handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Invalid relay URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Relay rejected event: {0}")]
    Rejected(String),

    #[error("Connection closed")]
    Closed,

    #[error("Subscription manager already started")]
    AlreadyStarted,

    #[error("Subscription manager not running")]
    NotRunning,
}

impl From<tokio_tungstenite::tungstenite::Error> for RelayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => RelayError::Closed,
            WsError::Io(e) => RelayError::Connect(e.to_string()),
            other => RelayError::Protocol(other.to_string()),
        }
    }
}
