//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresAccountRepository` - Account subscription state
//! - `PostgresProcessedZapStore` - Claims and processed zap records

mod account_repository;
mod processed_zap_store;

pub use account_repository::PostgresAccountRepository;
pub use processed_zap_store::PostgresProcessedZapStore;
