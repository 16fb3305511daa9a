use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::advisory::{AiRerankAdapter, ADVISORY_PICK_LIMIT};
use super::clock::{Clock, SystemClock};
use super::domain::{MatchOutcome, Opportunity, Provenance, RawProfile};
use super::normalizer::{normalize, ProfileError};
use super::selector::ShortlistSelector;

/// Sizes applied to each matching run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Entries handed to the advisory step; never fewer than three.
    pub shortlist_size: usize,
    /// Entries returned when the rule-based path wins; capped at the shortlist size.
    pub result_limit: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            shortlist_size: 8,
            result_limit: 3,
        }
    }
}

impl MatchSettings {
    fn advisory_shortlist(&self) -> usize {
        self.shortlist_size.max(ADVISORY_PICK_LIMIT)
    }

    fn rule_based_limit(&self) -> usize {
        self.result_limit.min(self.advisory_shortlist())
    }
}

/// Top-level entry point: normalize, shortlist, optionally rerank.
#[derive(Clone)]
pub struct MatchOrchestrator {
    selector: ShortlistSelector,
    advisor: Option<AiRerankAdapter>,
    clock: Arc<dyn Clock>,
    settings: MatchSettings,
}

impl Default for MatchOrchestrator {
    fn default() -> Self {
        Self::new(ShortlistSelector::default(), MatchSettings::default())
    }
}

impl MatchOrchestrator {
    pub fn new(selector: ShortlistSelector, settings: MatchSettings) -> Self {
        Self {
            selector,
            advisor: None,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_advisor(mut self, advisor: AiRerankAdapter) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> MatchSettings {
        self.settings
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Produce the final recommendations for `raw`.
    ///
    /// Only invalid profile input is an error. Advisory problems and empty catalogs
    /// degrade to the rule-based list.
    pub async fn match_profile(
        &self,
        raw: &RawProfile,
        opportunities: &[Opportunity],
        use_ai: bool,
    ) -> Result<MatchOutcome, ProfileError> {
        let profile = normalize(raw)?;
        let now = self.clock.now();
        let shortlist =
            self.selector
                .select(&profile, opportunities, self.settings.advisory_shortlist(), now);

        debug!(
            candidates = opportunities.len(),
            shortlisted = shortlist.len(),
            "shortlist built"
        );

        if use_ai {
            match &self.advisor {
                Some(advisor) => {
                    let reranked = advisor.rerank(&profile, &shortlist).await;
                    if reranked.provenance == Provenance::AiAdjusted && !reranked.results.is_empty()
                    {
                        info!(
                            provenance = Provenance::AiAdjusted.label(),
                            results = reranked.results.len(),
                            "match completed"
                        );
                        return Ok(MatchOutcome {
                            results: reranked.results,
                            provenance: Provenance::AiAdjusted,
                        });
                    }
                }
                None => debug!("advisory rerank requested but not configured"),
            }
        }

        let results: Vec<_> = shortlist
            .into_iter()
            .take(self.settings.rule_based_limit())
            .collect();

        info!(
            provenance = Provenance::RuleBased.label(),
            results = results.len(),
            "match completed"
        );
        Ok(MatchOutcome {
            results,
            provenance: Provenance::RuleBased,
        })
    }
}
