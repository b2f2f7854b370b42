//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `GIFT_ZAPS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use gift_zap_processor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! println!("Subscribing to {:?}", config.relays.subscribe_list());
//! ```

mod database;
mod error;
mod identity;
mod logging;
mod pricing;
mod relays;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use pricing::PricingConfig;
pub use relays::RelaysConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables
/// and validates the result.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Relay subscription and publishing
    #[serde(default)]
    pub relays: RelaysConfig,

    /// Service key pair
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Tier prices and price feed
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Optional PostgreSQL processed-zap store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load and validate configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `GIFT_ZAPS__RELAYS__SUBSCRIBE_URLS=wss://a,wss://b` -> `relays.subscribe_urls`
    /// - `GIFT_ZAPS__IDENTITY__SIGNING_KEY=...` -> `identity.signing_key`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values are missing, unparseable, or invalid.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GIFT_ZAPS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.relays.validate()?;
        self.identity.validate()?;
        self.pricing.validate()?;
        self.database.validate()?;
        Ok(())
    }
}

/// Splits a comma-separated list, dropping blank entries.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "GIFT_ZAPS__RELAYS__SUBSCRIBE_URLS",
        "GIFT_ZAPS__RELAYS__PUBLISH_URLS",
        "GIFT_ZAPS__IDENTITY__SIGNING_KEY",
        "GIFT_ZAPS__PRICING__PREMIUM_MONTHLY_CENTS",
        "GIFT_ZAPS__DATABASE__URL",
        "GIFT_ZAPS__LOGGING__FORMAT",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        env::set_var(
            "GIFT_ZAPS__RELAYS__SUBSCRIBE_URLS",
            "wss://relay.damus.io,wss://nos.lol",
        );
        env::set_var("GIFT_ZAPS__IDENTITY__SIGNING_KEY", "01".repeat(32));
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a , ,b,"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.relays.subscribe_list().len(), 2);
        assert_eq!(config.pricing.premium_monthly_cents, 1000);
        assert_eq!(config.database.url(), None);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GIFT_ZAPS__RELAYS__PUBLISH_URLS", "wss://op.example");
        env::set_var("GIFT_ZAPS__PRICING__PREMIUM_MONTHLY_CENTS", "1500");
        env::set_var("GIFT_ZAPS__DATABASE__URL", "postgresql://localhost/zaps");
        env::set_var("GIFT_ZAPS__LOGGING__FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.relays.publish_list(), vec!["wss://op.example"]);
        assert_eq!(config.pricing.premium_monthly_cents, 1500);
        assert_eq!(config.database.url(), Some("postgresql://localhost/zaps"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_relays_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("GIFT_ZAPS__IDENTITY__SIGNING_KEY", "01".repeat(32));
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(
            result,
            Err(ConfigError::ValidationFailed(ValidationError::MissingRequired(_)))
        ));
    }

    #[test]
    fn test_missing_signing_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("GIFT_ZAPS__RELAYS__SUBSCRIBE_URLS", "wss://relay.damus.io");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(
            result,
            Err(ConfigError::ValidationFailed(ValidationError::MissingRequired(
                "IDENTITY__SIGNING_KEY"
            )))
        ));
    }
}
