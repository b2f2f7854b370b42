//! Service identity configuration

use secp256k1::{Keypair, SECP256K1};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::PublicKey;

/// Service identity: the key gifts are zapped to and confirmations signed with.
#[derive(Debug, Default, Deserialize)]
pub struct IdentityConfig {
    /// Service public key (64 hex). Derived from the signing key when unset.
    pub service_pubkey: Option<String>,

    /// Secret signing key (64 hex)
    pub signing_key: Option<SecretString>,
}

impl IdentityConfig {
    /// Public key derived from the signing key.
    pub fn derived_pubkey(&self) -> Result<PublicKey, ValidationError> {
        let secret = self
            .signing_key
            .as_ref()
            .ok_or(ValidationError::MissingRequired("IDENTITY__SIGNING_KEY"))?;
        let bytes = hex::decode(secret.expose_secret().trim())
            .map_err(|_| ValidationError::InvalidSigningKey)?;
        let keypair = Keypair::from_seckey_slice(SECP256K1, &bytes)
            .map_err(|_| ValidationError::InvalidSigningKey)?;
        let (xonly, _) = keypair.x_only_public_key();
        PublicKey::parse(&hex::encode(xonly.serialize()))
            .map_err(|_| ValidationError::InvalidSigningKey)
    }

    /// The service public key, checked against the signing key.
    pub fn service_pubkey(&self) -> Result<PublicKey, ValidationError> {
        let derived = self.derived_pubkey()?;
        match &self.service_pubkey {
            None => Ok(derived),
            Some(configured) => {
                let configured = PublicKey::parse(configured)
                    .map_err(|_| ValidationError::InvalidPubkey("service_pubkey"))?;
                if configured == derived {
                    Ok(configured)
                } else {
                    Err(ValidationError::SigningKeyMismatch)
                }
            }
        }
    }

    /// Validate identity configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.service_pubkey().map(|_| ())
    }
}
