//! BIP-340 Schnorr event signer.
//!
//! The event id is the SHA-256 of the canonical `[0, pubkey, created_at, kind,
//! tags, content]` array; the signature is over those 32 bytes.

use std::fmt;

use secp256k1::{Keypair, Message, SECP256K1};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::zap::{compute_event_id, EventTemplate, NostrEvent};
use crate::ports::{EventSigner, SigningError};

/// Signs events with a secp256k1 key held in memory.
pub struct SchnorrSigner {
    keypair: Keypair,
    public_key: String,
}

impl SchnorrSigner {
    /// Builds a signer from a 64-character hex secret key.
    pub fn from_secret_hex(secret: &SecretString) -> Result<Self, SigningError> {
        let bytes = hex::decode(secret.expose_secret().trim())
            .map_err(|_| SigningError::InvalidKey("secret key is not hex".to_string()))?;
        Self::from_secret_bytes(&bytes)
    }

    /// Builds a signer from raw 32-byte secret key material.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        let keypair = Keypair::from_seckey_slice(SECP256K1, bytes)
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        let (xonly, _) = keypair.x_only_public_key();

        Ok(Self {
            keypair,
            public_key: hex::encode(xonly.serialize()),
        })
    }
}

impl fmt::Debug for SchnorrSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchnorrSigner")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl EventSigner for SchnorrSigner {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, template: EventTemplate) -> Result<NostrEvent, SigningError> {
        let id = compute_event_id(&self.public_key, &template)
            .map_err(|e| SigningError::Serialization(e.to_string()))?;
        let digest = hex::decode(&id).map_err(|e| SigningError::Serialization(e.to_string()))?;
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| SigningError::Signature(e.to_string()))?;
        let signature = SECP256K1.sign_schnorr_no_aux_rand(&message, &self.keypair);

        Ok(NostrEvent {
            id,
            pubkey: self.public_key.clone(),
            created_at: template.created_at,
            kind: template.kind,
            tags: template.tags,
            content: template.content,
            sig: hex::encode(signature.as_ref()),
        })
    }
}

/// Checks an event's id and Schnorr signature.
pub fn verify_event(event: &NostrEvent) -> Result<(), SigningError> {
    event
        .verify()
        .map_err(|e| SigningError::Signature(e.to_string()))
}
