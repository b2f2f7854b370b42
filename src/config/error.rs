//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid relay URL: {0}")]
    InvalidRelayUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(&'static str),

    #[error("Reconnect initial delay must be positive and not exceed the max delay")]
    InvalidBackoff,

    #[error("Invalid public key: {0}")]
    InvalidPubkey(&'static str),

    #[error("Signing key is not a valid 32-byte secret key")]
    InvalidSigningKey,

    #[error("Signing key does not match the configured service public key")]
    SigningKeyMismatch,

    #[error("Price must be positive: {0}")]
    InvalidPrice(&'static str),

    #[error("Invalid price feed URL")]
    InvalidPriceFeedUrl,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,
}
