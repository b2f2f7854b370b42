//! Gift Zap Processor service
//!
//! Loads configuration from the environment, wires adapters into the zap
//! handler, subscribes to the configured relays, and runs until Ctrl-C.
//!
//! The watch-list starts from the stored accounts and grows as gifts
//! create new ones.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use gift_zap_processor::adapters::memory::{InMemoryAccountRepository, InMemoryProcessedZapStore};
use gift_zap_processor::adapters::notify::LoggingPlainZapSink;
use gift_zap_processor::adapters::postgres::{
    PostgresAccountRepository, PostgresProcessedZapStore,
};
use gift_zap_processor::adapters::price::{HttpPriceFeed, HttpPriceFeedConfig};
use gift_zap_processor::adapters::relay::{
    apply_watchlist_updates, RelaySubscriptionConfig, RelaySubscriptionManager,
    WatchlistUpdates, WebSocketRelayPublisher,
};
use gift_zap_processor::adapters::signing::SchnorrSigner;
use gift_zap_processor::application::{NotificationPublisher, ProcessZapReceiptHandler};
use gift_zap_processor::config::{
    AppConfig, DatabaseConfig, LogFormat, LoggingConfig, ValidationError,
};
use gift_zap_processor::domain::gift::{PaymentValidator, SubscriptionLedger};
use gift_zap_processor::domain::pricing::PriceOracle;
use gift_zap_processor::domain::zap::ZapEventParser;
use gift_zap_processor::ports::{AccountRepository, EventSigner, ProcessedZapStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let service_pubkey = config.identity.service_pubkey()?;
    let signing_key = config
        .identity
        .signing_key
        .as_ref()
        .ok_or(ValidationError::MissingRequired("IDENTITY__SIGNING_KEY"))?;
    let signer = Arc::new(SchnorrSigner::from_secret_hex(signing_key)?);

    tracing::info!(
        service_pubkey = %service_pubkey,
        signer = %signer.public_key(),
        relays = ?config.relays.subscribe_list(),
        "Starting gift zap processor"
    );

    let feed = HttpPriceFeed::new(
        HttpPriceFeedConfig::new(config.pricing.price_feed_url.clone())
            .with_timeout(config.pricing.price_feed_timeout()),
    )?;
    let oracle = Arc::new(PriceOracle::new(Arc::new(feed)));
    let validator = Arc::new(PaymentValidator::new(config.pricing.tier_pricing(), oracle));

    let (accounts, zaps) = stores(&config.database).await?;
    let ledger = SubscriptionLedger::new(accounts.clone(), zaps);
    let (watchlist_updates, watchlist_rx) = WatchlistUpdates::channel();

    let notifier = Arc::new(NotificationPublisher::new(
        signer,
        Arc::new(WebSocketRelayPublisher::new(config.relays.publish_timeout())),
        config.relays.publish_list(),
    ));

    let handler = Arc::new(ProcessZapReceiptHandler::new(
        ZapEventParser::new(service_pubkey.clone()),
        validator,
        ledger,
        notifier,
        Arc::new(LoggingPlainZapSink),
    )
    .with_account_watcher(Arc::new(watchlist_updates)));

    let mut relay_config = RelaySubscriptionConfig::new(
        config.relays.subscribe_list(),
        service_pubkey,
        config.relays.since_floor,
    );
    relay_config.connect_timeout = config.relays.connect_timeout();
    relay_config.reconnect_initial_delay = config.relays.reconnect_initial_delay();
    relay_config.reconnect_max_delay = config.relays.reconnect_max_delay();
    relay_config.max_watched_pubkeys = config.relays.max_watched_pubkeys;

    let watched = accounts.list_pubkeys().await?;
    let manager = Arc::new(RelaySubscriptionManager::new(relay_config, handler));
    manager.start(&watched).await?;
    let watchlist_task = tokio::spawn(apply_watchlist_updates(
        manager.clone(),
        watched,
        watchlist_rx,
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    manager.stop().await;
    watchlist_task.abort();

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Account and processed-zap stores sharing one pool, or in-memory
/// stand-ins when no database is configured.
async fn stores(
    config: &DatabaseConfig,
) -> Result<(Arc<dyn AccountRepository>, Arc<dyn ProcessedZapStore>), Box<dyn Error>> {
    let url = match config.url() {
        Some(url) => url,
        None => {
            tracing::warn!("No database configured; accounts and processed zaps are kept in memory");
            return Ok((
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemoryProcessedZapStore::new()),
            ));
        }
    };

    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(url)
        .await?;

    let accounts = PostgresAccountRepository::new(pool.clone());
    accounts.ensure_schema().await?;
    let zaps = PostgresProcessedZapStore::new(pool);
    zaps.ensure_schema().await?;
    tracing::info!("Using PostgreSQL account and processed zap stores");

    Ok((Arc::new(accounts), Arc::new(zaps)))
}
