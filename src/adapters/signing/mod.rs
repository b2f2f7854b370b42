//! Event signing adapters.

mod schnorr_signer;

pub use schnorr_signer::{verify_event, SchnorrSigner};
