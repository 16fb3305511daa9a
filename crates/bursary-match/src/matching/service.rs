use std::sync::Arc;

use tracing::warn;

use super::domain::{MatchOutcome, Opportunity, OpportunityDraft, Provenance, RawProfile};
use super::normalizer::{normalize, ProfileError};
use super::orchestrator::MatchOrchestrator;
use super::store::{OpportunityStore, StoreError};

/// Service composing the opportunity store with the match orchestrator.
pub struct BursaryMatchService<S> {
    store: Arc<S>,
    orchestrator: Arc<MatchOrchestrator>,
}

impl<S> BursaryMatchService<S>
where
    S: OpportunityStore + 'static,
{
    pub fn new(store: Arc<S>, orchestrator: MatchOrchestrator) -> Self {
        Self {
            store,
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn orchestrator(&self) -> &MatchOrchestrator {
        &self.orchestrator
    }

    /// Match `raw` against the stored collection.
    ///
    /// An unavailable store reads as an empty collection; only profile errors surface.
    pub async fn recommend(
        &self,
        raw: &RawProfile,
        use_ai: bool,
    ) -> Result<MatchOutcome, ProfileError> {
        let opportunities = match self.store.fetch_all() {
            Ok(opportunities) => opportunities,
            Err(err) => {
                warn!(error = %err, "opportunity store unavailable; matching against empty collection");
                normalize(raw)?;
                return Ok(MatchOutcome {
                    results: Vec::new(),
                    provenance: Provenance::RuleBased,
                });
            }
        };

        self.orchestrator
            .match_profile(raw, &opportunities, use_ai)
            .await
    }

    pub fn opportunities(&self) -> Result<Vec<Opportunity>, StoreError> {
        self.store.fetch_all()
    }

    /// Insert or replace a record; repeated drafts with the same title converge on one entry.
    pub fn upsert(&self, draft: OpportunityDraft) -> Result<Opportunity, StoreError> {
        self.store.upsert(draft)
    }
}
