//! In-memory adapters for local runs and tests.

mod account_repository;
mod processed_zap_store;

pub use account_repository::InMemoryAccountRepository;
pub use processed_zap_store::InMemoryProcessedZapStore;
