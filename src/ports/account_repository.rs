//! Account repository port.
//!
//! Accounts are owned by the wider service. The gift processor only reads and
//! writes them through this surface and never touches their storage directly.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PublicKey};
use crate::domain::subscription::Account;

/// Repository port for account subscription state.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its public key.
    ///
    /// Returns `None` if no account exists.
    async fn find_by_pubkey(&self, pubkey: &PublicKey) -> Result<Option<Account>, DomainError>;

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// - `AccountAlreadyExists` if the pubkey is taken
    /// - `DatabaseError` on persistence failure
    async fn create(&self, account: &Account) -> Result<(), DomainError>;

    /// Replace an existing account.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account does not exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, account: &Account) -> Result<(), DomainError>;

    /// Public keys of every stored account.
    ///
    /// Seeds the relay watch-list at startup.
    async fn list_pubkeys(&self) -> Result<Vec<PublicKey>, DomainError>;
}
