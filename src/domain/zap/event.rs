//! Relay event model.
//!
//! Events arrive from relays as loosely-typed JSON. This module gives them a
//! typed shape with named tag accessors so the rest of the pipeline never
//! indexes into raw arrays.

use secp256k1::schnorr::Signature;
use secp256k1::{Message, XOnlyPublicKey, SECP256K1};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Kind of the payment-intent event embedded in a receipt.
pub const ZAP_REQUEST_KIND: u16 = 9734;

/// Kind of the payment receipt broadcast after a zap is paid.
pub const ZAP_RECEIPT_KIND: u16 = 9735;

/// Kind of a public text note, used for gift confirmations.
pub const TEXT_NOTE_KIND: u16 = 1;

/// A tag expressed as an array of strings.
///
/// The first element is the tag name (`p`, `e`, `bolt11`, ...), the rest
/// hold data. Tags are stored verbatim so unknown tags survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Builds a tag from a name and values.
    pub fn new<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = vec![name.to_string()];
        parts.extend(values.into_iter().map(Into::into));
        Self(parts)
    }

    /// Tag name, or "" for an empty tag.
    pub fn name(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    /// First value after the name.
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// All values after the name.
    pub fn values(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }
}

/// A signed relay event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NostrEvent {
    /// Event identifier (hex of SHA-256 over the canonical form).
    pub id: String,
    /// Author public key (hex).
    pub pubkey: String,
    /// Unix timestamp of creation.
    pub created_at: u64,
    /// Event kind.
    pub kind: u16,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Content body.
    #[serde(default)]
    pub content: String,
    /// Schnorr signature over the id.
    #[serde(default)]
    pub sig: String,
}

impl NostrEvent {
    /// Value of the first tag named `name`.
    pub fn first_tag_value(&self, name: &str) -> Option<&str> {
        first_tag_value(&self.tags, name)
    }

    /// Values of every tag named `name`, in order.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        tag_values(&self.tags, name)
    }

    /// The signed fields, without id, author or signature.
    pub fn template(&self) -> EventTemplate {
        EventTemplate {
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags.clone(),
            content: self.content.clone(),
        }
    }

    /// Checks that the id is the hash of the event and the signature is the
    /// author's BIP-340 signature over it.
    pub fn verify(&self) -> Result<(), VerifyError> {
        let expected = compute_event_id(&self.pubkey, &self.template())
            .map_err(|_| VerifyError::Malformed("event"))?;
        if expected != self.id {
            return Err(VerifyError::IdMismatch);
        }

        let digest = hex::decode(&expected).map_err(|_| VerifyError::Malformed("id"))?;
        let sig_bytes = hex::decode(&self.sig).map_err(|_| VerifyError::Malformed("sig"))?;
        let pk_bytes = hex::decode(&self.pubkey).map_err(|_| VerifyError::Malformed("pubkey"))?;

        let signature =
            Signature::from_slice(&sig_bytes).map_err(|_| VerifyError::Malformed("sig"))?;
        let pubkey =
            XOnlyPublicKey::from_slice(&pk_bytes).map_err(|_| VerifyError::Malformed("pubkey"))?;
        let message =
            Message::from_digest_slice(&digest).map_err(|_| VerifyError::Malformed("id"))?;

        SECP256K1
            .verify_schnorr(&signature, &message, &pubkey)
            .map_err(|_| VerifyError::BadSignature)
    }
}

/// Why an event failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("id does not match event contents")]
    IdMismatch,

    #[error("malformed {0}")]
    Malformed(&'static str),

    #[error("signature does not verify")]
    BadSignature,
}

/// An unsigned event ready to be hashed and signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTemplate {
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Tag>,
    pub content: String,
}

/// Computes the event id: hex SHA-256 of `[0, pubkey, created_at, kind, tags, content]`.
pub fn compute_event_id(pubkey: &str, template: &EventTemplate) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(&(
        0,
        pubkey,
        template.created_at,
        template.kind,
        &template.tags,
        &template.content,
    ))?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(hex::encode(digest))
}

pub(crate) fn first_tag_value<'a>(tags: &'a [Tag], name: &str) -> Option<&'a str> {
    tags.iter().find(|t| t.name() == name).and_then(Tag::value)
}

pub(crate) fn tag_values<'a>(tags: &'a [Tag], name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    tags.iter()
        .filter(move |t| t.name() == name)
        .filter_map(Tag::value)
}
