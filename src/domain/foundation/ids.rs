//! Strongly-typed identifier value objects.

use bech32::{Bech32, Hrp};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

static HEX_64: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-fA-F0-9]{64}$").expect("static regex is valid"));

/// Returns true if `value` is exactly 64 hexadecimal characters (either case).
pub fn is_hex64(value: &str) -> bool {
    HEX_64.is_match(value)
}

/// Identifier of a relay event.
///
/// Event ids are content-addressed, so the same id seen on two relays is the
/// same event. Used as the idempotency key for processed zaps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an EventId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("event_id"));
        }
        Ok(Self(id))
    }

    /// Creates an EventId from a trusted string without validation.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex-encoded x-only public key identifying a user or the service.
///
/// Always stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(String);

impl PublicKey {
    /// Parses a 64-character hex public key, normalizing to lowercase.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if !is_hex64(value) {
            return Err(ValidationError::invalid_format(
                "pubkey",
                "expected 64 hexadecimal characters",
            ));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a shortened form for logs and human-readable text.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }

    /// Bech32 `npub` encoding, the form `nostr:` URIs expect.
    pub fn to_npub(&self) -> Result<String, ValidationError> {
        let bytes = hex::decode(&self.0)
            .map_err(|e| ValidationError::invalid_format("pubkey", e.to_string()))?;
        let hrp = Hrp::parse("npub")
            .map_err(|e| ValidationError::invalid_format("pubkey", e.to_string()))?;
        bech32::encode::<Bech32>(hrp, &bytes)
            .map_err(|e| ValidationError::invalid_format("pubkey", e.to_string()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PublicKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PublicKey> for String {
    fn from(value: PublicKey) -> Self {
        value.0
    }
}
