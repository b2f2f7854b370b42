//! Event signer port.

use thiserror::Error;

use crate::domain::zap::{EventTemplate, NostrEvent};

/// Errors from event signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Failed to serialize event: {0}")]
    Serialization(String),

    #[error("Signing failed: {0}")]
    Signature(String),
}

/// Signs events with the service identity.
pub trait EventSigner: Send + Sync {
    /// Hex x-only public key of the signing identity.
    fn public_key(&self) -> &str;

    /// Computes the id of `template` and signs it.
    fn sign(&self, template: EventTemplate) -> Result<NostrEvent, SigningError>;
}
