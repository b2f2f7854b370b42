//! In-memory account repository.
//!
//! Stands in for the external account store. Used by the binary when no
//! account backend is wired in, and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PublicKey};
use crate::domain::subscription::Account;
use crate::ports::AccountRepository;

/// HashMap-backed account store.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<PublicKey, Account>>,
    fail_writes: AtomicBool,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account directly.
    pub async fn insert(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.pubkey.clone(), account);
    }

    /// Public keys of every stored account.
    pub async fn pubkeys(&self) -> Vec<PublicKey> {
        self.accounts.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    /// Makes `create` and `update` fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("account store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_pubkey(&self, pubkey: &PublicKey) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(pubkey).cloned())
    }

    async fn create(&self, account: &Account) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.pubkey) {
            return Err(DomainError::new(
                ErrorCode::AccountAlreadyExists,
                format!("Account {} already exists", account.pubkey),
            ));
        }
        accounts.insert(account.pubkey.clone(), account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.pubkey) {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account {} not found", account.pubkey),
            )),
        }
    }

    async fn list_pubkeys(&self) -> Result<Vec<PublicKey>, DomainError> {
        Ok(self.pubkeys().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn account() -> Account {
        Account::new_free(PublicKey::parse(&"ab".repeat(32)).unwrap(), Timestamp::now())
    }

    #[tokio::test]
    async fn create_then_find() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&account()).await.unwrap();

        let found = repo.find_by_pubkey(&account().pubkey).await.unwrap();
        assert!(found.is_some());
        assert_eq!(repo.list_pubkeys().await.unwrap(), vec![account().pubkey]);
    }

    #[tokio::test]
    async fn create_twice_is_conflict() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&account()).await.unwrap();

        let err = repo.create(&account()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountAlreadyExists);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let repo = InMemoryAccountRepository::new();
        let err = repo.update(&account()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountNotFound);
    }

    #[tokio::test]
    async fn failing_writes_leave_store_untouched() {
        let repo = InMemoryAccountRepository::new();
        repo.fail_writes(true);

        let err = repo.create(&account()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(repo.is_empty().await);
    }
}
