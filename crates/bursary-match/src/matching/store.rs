use std::sync::{Arc, Mutex};

use super::domain::{Opportunity, OpportunityDraft};

/// Storage abstraction for the opportunity collection.
pub trait OpportunityStore: Send + Sync {
    /// Every stored opportunity, in collection order.
    fn fetch_all(&self) -> Result<Vec<Opportunity>, StoreError>;
    /// Insert or replace the record whose id is derived from `draft.title`.
    fn upsert(&self, draft: OpportunityDraft) -> Result<Opportunity, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("opportunity store unavailable: {0}")]
    Unavailable(String),
    #[error("opportunity title must not be empty")]
    EmptyTitle,
}

/// Vector-backed store that keeps first-insertion order across upserts.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOpportunityStore {
    records: Arc<Mutex<Vec<Opportunity>>>,
}

impl InMemoryOpportunityStore {
    pub fn with_drafts(drafts: impl IntoIterator<Item = OpportunityDraft>) -> Result<Self, StoreError> {
        let store = Self::default();
        for draft in drafts {
            store.upsert(draft)?;
        }
        Ok(store)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Opportunity>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl OpportunityStore for InMemoryOpportunityStore {
    fn fetch_all(&self) -> Result<Vec<Opportunity>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn upsert(&self, draft: OpportunityDraft) -> Result<Opportunity, StoreError> {
        let opportunity = Opportunity::from(draft);
        if opportunity.id.0.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let mut records = self.lock()?;
        match records
            .iter_mut()
            .find(|existing| existing.id == opportunity.id)
        {
            Some(existing) => *existing = opportunity.clone(),
            None => records.push(opportunity.clone()),
        }
        Ok(opportunity)
    }
}
