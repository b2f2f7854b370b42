//! Subscription ledger - idempotency records and the gift state transition.
//!
//! ## Concurrency
//!
//! The only synchronization point in the gift pipeline is
//! [`ProcessedZapStore::claim`]. A delivery that loses the claim stops before
//! touching the account store, so duplicate deliveries can never apply the
//! same gift twice.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, PublicKey, Timestamp};
use crate::domain::subscription::{Account, ExpiryOutOfRange, GiftTransition, SubscriptionTier};
use crate::ports::{AccountRepository, ClaimResult, ProcessedZapStore, SaveResult};

use super::{GiftError, ProcessedZapRecord};

/// Result of applying a gift to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftActivation {
    pub account: Account,
    pub transition: GiftTransition,
}

/// Tracks processed zaps and applies gifts to accounts.
#[derive(Clone)]
pub struct SubscriptionLedger {
    accounts: Arc<dyn AccountRepository>,
    zaps: Arc<dyn ProcessedZapStore>,
}

impl SubscriptionLedger {
    pub fn new(accounts: Arc<dyn AccountRepository>, zaps: Arc<dyn ProcessedZapStore>) -> Self {
        Self { accounts, zaps }
    }

    /// Returns true if this receipt was already claimed or recorded.
    pub async fn is_processed(&self, event_id: &EventId) -> Result<bool, GiftError> {
        self.zaps.exists(event_id).await.map_err(GiftError::Ledger)
    }

    /// Atomically claims the receipt for processing.
    pub async fn claim(&self, event_id: &EventId) -> Result<ClaimResult, GiftError> {
        self.zaps.claim(event_id).await.map_err(GiftError::Ledger)
    }

    /// Stores the outcome record. A concurrent duplicate is not an error.
    pub async fn record_outcome(&self, record: ProcessedZapRecord) -> Result<(), GiftError> {
        let event_id = record.event_id.clone();
        let status = record.status;

        match self.zaps.insert_once(record).await.map_err(GiftError::Ledger)? {
            SaveResult::Inserted => {
                tracing::debug!(event_id = %event_id, status = %status, "Processed zap recorded");
            }
            SaveResult::AlreadyExists => {
                tracing::debug!(
                    event_id = %event_id,
                    status = %status,
                    "Processed zap already recorded by another delivery"
                );
            }
        }
        Ok(())
    }

    /// Applies a gift to `pubkey` at the current time.
    pub async fn apply_gift(
        &self,
        pubkey: &PublicKey,
        tier: SubscriptionTier,
        months: u8,
    ) -> Result<GiftActivation, GiftError> {
        self.apply_gift_at(pubkey, tier, months, Timestamp::now()).await
    }

    /// Applies a gift with an explicit clock.
    ///
    /// - No account: create one on the gifted tier, expiring `now + months × 31d`
    /// - Active: extend from the current expiry
    /// - Expired or never subscribed: restart from `now`
    ///
    /// The gifted tier always replaces the stored tier.
    pub async fn apply_gift_at(
        &self,
        pubkey: &PublicKey,
        tier: SubscriptionTier,
        months: u8,
        now: Timestamp,
    ) -> Result<GiftActivation, GiftError> {
        let existing = self
            .accounts
            .find_by_pubkey(pubkey)
            .await
            .map_err(GiftError::Activation)?;

        match existing {
            None => {
                let account = Account::from_gift(pubkey.clone(), tier, months, now)
                    .map_err(out_of_range)?;
                self.accounts
                    .create(&account)
                    .await
                    .map_err(GiftError::Activation)?;
                Ok(GiftActivation {
                    account,
                    transition: GiftTransition::Created,
                })
            }
            Some(mut account) => {
                if account.tier.is_paid() && account.tier != tier && account.is_active(now) {
                    tracing::warn!(
                        pubkey = %pubkey.short(),
                        from = %account.tier,
                        to = %tier,
                        "Gift overwrites tier of an active subscription"
                    );
                }
                let transition = account
                    .apply_gift(tier, months, now)
                    .map_err(out_of_range)?;
                self.accounts
                    .update(&account)
                    .await
                    .map_err(GiftError::Activation)?;
                Ok(GiftActivation {
                    account,
                    transition,
                })
            }
        }
    }
}

fn out_of_range(e: ExpiryOutOfRange) -> GiftError {
    GiftError::Activation(DomainError::new(ErrorCode::ValidationFailed, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccountRepository, InMemoryProcessedZapStore};
    use crate::domain::gift::ZapStatus;
    use crate::domain::subscription::gift_duration;

    const DAY_MS: i64 = 24 * 3600 * 1000;

    fn pubkey() -> PublicKey {
        PublicKey::parse(&"ab".repeat(32)).unwrap()
    }

    fn ledger() -> (
        SubscriptionLedger,
        Arc<InMemoryAccountRepository>,
        Arc<InMemoryProcessedZapStore>,
    ) {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let zaps = Arc::new(InMemoryProcessedZapStore::new());
        (
            SubscriptionLedger::new(accounts.clone(), zaps.clone()),
            accounts,
            zaps,
        )
    }

    fn record(event_id: &str, status: ZapStatus) -> ProcessedZapRecord {
        ProcessedZapRecord {
            event_id: EventId::from_string(event_id),
            recipient_pubkey: pubkey(),
            gifted_by: "cd".repeat(32),
            tier: SubscriptionTier::Premium,
            months: 1,
            amount_sats: 10_000,
            status,
            error_message: None,
            processed_at: Timestamp::now(),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Idempotency records
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn claim_marks_event_processed() {
        let (ledger, _, _) = ledger();
        let id = EventId::from_string("evt1");

        assert!(!ledger.is_processed(&id).await.unwrap());
        assert_eq!(ledger.claim(&id).await.unwrap(), ClaimResult::Claimed);
        assert!(ledger.is_processed(&id).await.unwrap());
        assert_eq!(ledger.claim(&id).await.unwrap(), ClaimResult::AlreadyClaimed);
    }

    #[tokio::test]
    async fn duplicate_record_is_swallowed() {
        let (ledger, _, zaps) = ledger();

        ledger.record_outcome(record("evt1", ZapStatus::Success)).await.unwrap();
        ledger.record_outcome(record("evt1", ZapStatus::Failed)).await.unwrap();

        let stored = zaps.records().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, ZapStatus::Success);
    }

    // ══════════════════════════════════════════════════════════════
    // Gift state machine
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn gift_creates_missing_account() {
        let (ledger, accounts, _) = ledger();
        let now = Timestamp::now();

        let activation = ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::Premium, 1, now)
            .await
            .unwrap();

        assert_eq!(activation.transition, GiftTransition::Created);
        let stored = accounts.find_by_pubkey(&pubkey()).await.unwrap().unwrap();
        assert_eq!(stored.tier, SubscriptionTier::Premium);
        assert_eq!(stored.expires_at, Some(now.plus(gift_duration(1))));
        assert_eq!(stored.username, None);
        assert_eq!(stored.entitlements.tier, SubscriptionTier::Premium);
    }

    #[tokio::test]
    async fn active_subscription_is_extended_from_expiry() {
        let (ledger, accounts, _) = ledger();
        let start = Timestamp::now();
        ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::Premium, 1, start)
            .await
            .unwrap();
        let first_expiry = start.plus(gift_duration(1));

        let later = start.plus_days(10);
        let activation = ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::Premium, 2, later)
            .await
            .unwrap();

        assert_eq!(
            activation.transition,
            GiftTransition::Extended {
                previous_expiry: first_expiry
            }
        );
        let stored = accounts.find_by_pubkey(&pubkey()).await.unwrap().unwrap();
        let expiry = stored.expires_at.unwrap();
        assert_eq!(expiry.as_millis(), first_expiry.as_millis() + 62 * DAY_MS);
    }

    #[tokio::test]
    async fn expired_subscription_restarts_from_now() {
        let (ledger, accounts, _) = ledger();
        let start = Timestamp::now();
        ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::Premium, 1, start)
            .await
            .unwrap();

        let later = start.plus_days(40);
        ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::Premium, 1, later)
            .await
            .unwrap();

        let stored = accounts.find_by_pubkey(&pubkey()).await.unwrap().unwrap();
        assert_eq!(stored.expires_at, Some(later.plus(gift_duration(1))));
    }

    #[tokio::test]
    async fn free_account_without_expiry_restarts() {
        let (ledger, accounts, _) = ledger();
        let now = Timestamp::now();
        accounts.insert(Account::new_free(pubkey(), now)).await;

        let activation = ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::PremiumPlus, 3, now)
            .await
            .unwrap();

        assert_eq!(
            activation.transition,
            GiftTransition::Restarted {
                previous_expiry: None
            }
        );
        assert_eq!(activation.account.tier, SubscriptionTier::PremiumPlus);
        assert_eq!(activation.account.expires_at, Some(now.plus(gift_duration(3))));
    }

    #[tokio::test]
    async fn lower_tier_gift_overwrites_active_higher_tier() {
        let (ledger, _, _) = ledger();
        let now = Timestamp::now();
        ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::PremiumPlus, 6, now)
            .await
            .unwrap();

        let activation = ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::Premium, 1, now.plus_days(1))
            .await
            .unwrap();

        assert_eq!(activation.account.tier, SubscriptionTier::Premium);
        assert_eq!(activation.account.entitlements.tier, SubscriptionTier::Premium);
        assert_eq!(
            activation.account.expires_at,
            Some(now.plus(gift_duration(6)).plus(gift_duration(1)))
        );
    }

    #[tokio::test]
    async fn account_store_failure_is_activation_error() {
        let (_, _, zaps) = ledger();
        let accounts = Arc::new(InMemoryAccountRepository::new());
        accounts.fail_writes(true);
        let ledger = SubscriptionLedger::new(accounts.clone(), zaps);

        let result = ledger
            .apply_gift(&pubkey(), SubscriptionTier::Premium, 1)
            .await;

        assert!(matches!(result, Err(GiftError::Activation(_))));
        assert!(accounts.find_by_pubkey(&pubkey()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn out_of_range_stored_expiry_is_activation_error() {
        let (ledger, accounts, _) = ledger();
        let now = Timestamp::now();
        let mut account = Account::new_free(pubkey(), now);
        account.expires_at = Some(Timestamp::from_datetime(
            chrono::DateTime::<chrono::Utc>::MAX_UTC,
        ));
        accounts.insert(account.clone()).await;

        let result = ledger
            .apply_gift_at(&pubkey(), SubscriptionTier::Premium, 1, now)
            .await;

        assert!(matches!(result, Err(GiftError::Activation(_))));
        let stored = accounts.find_by_pubkey(&pubkey()).await.unwrap().unwrap();
        assert_eq!(stored, account);
    }
}
