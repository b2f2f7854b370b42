//! PostgreSQL implementation of AccountRepository.
//!
//! Only the subscription fields are stored. Entitlements are derived from
//! the tier when a row is read back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, PublicKey, Timestamp};
use crate::domain::subscription::{Account, SubscriptionTier, TierEntitlements};
use crate::ports::AccountRepository;

const CREATE_ACCOUNTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS accounts (
        pubkey TEXT PRIMARY KEY,
        tier TEXT NOT NULL,
        expires_at TIMESTAMPTZ,
        username TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
"#;

/// PostgreSQL implementation of the AccountRepository port.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the accounts table if missing.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_ACCOUNTS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to create schema: {}", e)))?;
        Ok(())
    }
}

/// Database row representation of an account.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    pubkey: String,
    tier: String,
    expires_at: Option<DateTime<Utc>>,
    username: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let tier = parse_tier(&row.tier)?;
        let pubkey = PublicKey::parse(&row.pubkey).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid pubkey: {}", e))
        })?;

        Ok(Account {
            pubkey,
            tier,
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            entitlements: TierEntitlements::for_tier(tier),
            username: row.username,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_tier(s: &str) -> Result<SubscriptionTier, DomainError> {
    s.parse().map_err(|_| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid tier: {}", s))
    })
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_pubkey(&self, pubkey: &PublicKey) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT pubkey, tier, expires_at, username, created_at, updated_at
            FROM accounts
            WHERE pubkey = $1
            "#,
        )
        .bind(pubkey.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch account: {}", e)))?;

        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: &Account) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                pubkey, tier, expires_at, username, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.pubkey.as_str())
        .bind(account.tier.as_str())
        .bind(account.expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&account.username)
        .bind(account.created_at.as_datetime())
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("accounts_pkey") {
                    return DomainError::new(
                        ErrorCode::AccountAlreadyExists,
                        format!("Account {} already exists", account.pubkey),
                    );
                }
            }
            DomainError::database(format!("Failed to save account: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                tier = $2,
                expires_at = $3,
                username = $4,
                updated_at = $5
            WHERE pubkey = $1
            "#,
        )
        .bind(account.pubkey.as_str())
        .bind(account.tier.as_str())
        .bind(account.expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&account.username)
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update account: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account {} not found", account.pubkey),
            ));
        }

        Ok(())
    }

    async fn list_pubkeys(&self) -> Result<Vec<PublicKey>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT pubkey FROM accounts")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to list accounts: {}", e)))?;

        rows.into_iter()
            .map(|(pubkey,)| {
                PublicKey::parse(&pubkey).map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Invalid pubkey: {}", e))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tier: &str) -> AccountRow {
        AccountRow {
            pubkey: "ab".repeat(32),
            tier: tier.to_string(),
            expires_at: None,
            username: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_with_entitlements_for_tier() {
        let mut row = row("premium-plus");
        let expiry = Utc::now();
        row.expires_at = Some(expiry);

        let account = Account::try_from(row).unwrap();

        assert_eq!(account.tier, SubscriptionTier::PremiumPlus);
        assert_eq!(
            account.entitlements,
            TierEntitlements::for_tier(SubscriptionTier::PremiumPlus)
        );
        assert_eq!(account.expires_at, Some(Timestamp::from_datetime(expiry)));
    }

    #[test]
    fn free_row_without_expiry_converts() {
        let account = Account::try_from(row("free")).unwrap();
        assert_eq!(account.tier, SubscriptionTier::Free);
        assert!(account.expires_at.is_none());
    }

    #[test]
    fn unknown_tier_is_database_error() {
        let err = Account::try_from(row("platinum")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn malformed_pubkey_is_database_error() {
        let mut row = row("premium");
        row.pubkey = "not-a-key".to_string();

        let err = Account::try_from(row).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn accounts_table_keys_on_pubkey() {
        assert!(CREATE_ACCOUNTS_TABLE.contains("pubkey TEXT PRIMARY KEY"));
    }
}
