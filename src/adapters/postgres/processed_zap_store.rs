//! PostgreSQL implementation of ProcessedZapStore.
//!
//! Both tables are keyed by the receipt id. `claim` and `insert_once` use
//! `INSERT ... ON CONFLICT (event_id) DO NOTHING` and read `rows_affected`
//! to learn whether this caller won.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, EventId};
use crate::domain::gift::ProcessedZapRecord;
use crate::ports::{ClaimResult, ProcessedZapStore, SaveResult};

const CREATE_CLAIMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS zap_claims (
        event_id TEXT PRIMARY KEY,
        claimed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_RECORDS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS processed_zaps (
        event_id TEXT PRIMARY KEY,
        recipient_pubkey TEXT NOT NULL,
        gifted_by TEXT NOT NULL,
        tier TEXT NOT NULL,
        months SMALLINT NOT NULL,
        amount_sats BIGINT NOT NULL,
        status TEXT NOT NULL,
        error_message TEXT,
        processed_at TIMESTAMPTZ NOT NULL
    )
"#;

/// PostgreSQL implementation of the ProcessedZapStore port.
pub struct PostgresProcessedZapStore {
    pool: PgPool,
}

impl PostgresProcessedZapStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the claim and record tables if missing.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        for ddl in [CREATE_CLAIMS_TABLE, CREATE_RECORDS_TABLE] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to create schema: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessedZapStore for PostgresProcessedZapStore {
    async fn exists(&self, event_id: &EventId) -> Result<bool, DomainError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (SELECT 1 FROM zap_claims WHERE event_id = $1)
                OR EXISTS (SELECT 1 FROM processed_zaps WHERE event_id = $1)
            "#,
        )
        .bind(event_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check processed zap: {}", e)))?;

        Ok(exists)
    }

    async fn claim(&self, event_id: &EventId) -> Result<ClaimResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO zap_claims (event_id) VALUES ($1)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to claim zap: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(ClaimResult::AlreadyClaimed)
        } else {
            Ok(ClaimResult::Claimed)
        }
    }

    async fn insert_once(&self, record: ProcessedZapRecord) -> Result<SaveResult, DomainError> {
        let amount_sats = i64::try_from(record.amount_sats).map_err(|_| {
            DomainError::new(ErrorCode::ValidationFailed, "amount_sats exceeds BIGINT range")
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO processed_zaps (
                event_id, recipient_pubkey, gifted_by, tier, months,
                amount_sats, status, error_message, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(record.event_id.as_str())
        .bind(record.recipient_pubkey.as_str())
        .bind(&record.gifted_by)
        .bind(record.tier.as_str())
        .bind(i16::from(record.months))
        .bind(amount_sats)
        .bind(record.status.as_str())
        .bind(&record.error_message)
        .bind(record.processed_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save processed zap: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_table_keys_on_event_id() {
        assert!(CREATE_RECORDS_TABLE.contains("event_id TEXT PRIMARY KEY"));
        assert!(CREATE_CLAIMS_TABLE.contains("event_id TEXT PRIMARY KEY"));
    }
}
