//! In-memory processed-zap store.
//!
//! Claims and records live behind a single write lock, so `claim` and
//! `insert_once` are atomic check-and-insert operations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EventId};
use crate::domain::gift::ProcessedZapRecord;
use crate::ports::{ClaimResult, ProcessedZapStore, SaveResult};

#[derive(Default)]
struct State {
    claims: HashSet<EventId>,
    records: HashMap<EventId, ProcessedZapRecord>,
}

/// Lock-guarded processed-zap store.
#[derive(Default)]
pub struct InMemoryProcessedZapStore {
    state: RwLock<State>,
}

impl InMemoryProcessedZapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records, in no particular order.
    pub async fn records(&self) -> Vec<ProcessedZapRecord> {
        self.state.read().await.records.values().cloned().collect()
    }

    /// Number of claimed receipt ids.
    pub async fn claim_count(&self) -> usize {
        self.state.read().await.claims.len()
    }
}

#[async_trait]
impl ProcessedZapStore for InMemoryProcessedZapStore {
    async fn exists(&self, event_id: &EventId) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state.claims.contains(event_id) || state.records.contains_key(event_id))
    }

    async fn claim(&self, event_id: &EventId) -> Result<ClaimResult, DomainError> {
        let mut state = self.state.write().await;
        if state.claims.insert(event_id.clone()) {
            Ok(ClaimResult::Claimed)
        } else {
            Ok(ClaimResult::AlreadyClaimed)
        }
    }

    async fn insert_once(&self, record: ProcessedZapRecord) -> Result<SaveResult, DomainError> {
        let mut state = self.state.write().await;
        if state.records.contains_key(&record.event_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        state.records.insert(record.event_id.clone(), record);
        Ok(SaveResult::Inserted)
    }
}
