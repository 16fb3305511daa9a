use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use super::response::{parse_picks, AdvisoryPick};
use super::{AdvisoryError, AdvisoryRerankService};
use crate::matching::domain::{MatchResult, Profile, Provenance};

/// Maximum number of entries the advisory step may return.
pub const ADVISORY_PICK_LIMIT: usize = 3;

/// Outcome of a rerank attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Reranked {
    pub results: Vec<MatchResult>,
    pub provenance: Provenance,
}

impl Reranked {
    fn fallback(shortlist: &[MatchResult]) -> Self {
        Self {
            results: shortlist.iter().take(ADVISORY_PICK_LIMIT).cloned().collect(),
            provenance: Provenance::RuleBased,
        }
    }
}

/// Sends the shortlist to an advisory service and parses its answer defensively.
#[derive(Clone)]
pub struct AiRerankAdapter {
    service: Arc<dyn AdvisoryRerankService>,
    timeout: Duration,
}

impl AiRerankAdapter {
    pub fn new(service: Arc<dyn AdvisoryRerankService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Rerank `shortlist`; never fails. Any advisory problem yields the first three
    /// shortlist entries unchanged with rule-based provenance.
    pub async fn rerank(&self, profile: &Profile, shortlist: &[MatchResult]) -> Reranked {
        if shortlist.is_empty() {
            return Reranked {
                results: Vec::new(),
                provenance: Provenance::RuleBased,
            };
        }

        let prompt = build_prompt(profile, shortlist);
        let picks = match self.request(&prompt).await {
            Ok(picks) => picks,
            Err(err) => {
                warn!(error = %err, "advisory rerank unavailable; keeping rule-based shortlist");
                return Reranked::fallback(shortlist);
            }
        };

        let results: Vec<MatchResult> = picks
            .into_iter()
            .take(ADVISORY_PICK_LIMIT)
            .map(|pick| attach_url(pick, shortlist))
            .collect();

        info!(picks = results.len(), "advisory rerank applied");
        Reranked {
            results,
            provenance: Provenance::AiAdjusted,
        }
    }

    async fn request(&self, prompt: &str) -> Result<Vec<AdvisoryPick>, AdvisoryError> {
        let text = tokio::time::timeout(self.timeout, self.service.generate(prompt))
            .await
            .map_err(|_| AdvisoryError::Timeout(self.timeout))??;

        debug!(bytes = text.len(), "advisory response received");
        parse_picks(&text).ok_or(AdvisoryError::Malformed)
    }
}

fn attach_url(pick: AdvisoryPick, shortlist: &[MatchResult]) -> MatchResult {
    let wanted = pick.title.trim().to_lowercase();
    let url = shortlist
        .iter()
        .find(|candidate| candidate.title.trim().to_lowercase() == wanted)
        .and_then(|candidate| candidate.url.clone());

    MatchResult {
        title: pick.title,
        reason: pick.reason,
        eligibility: pick.eligibility,
        url,
    }
}

pub(crate) fn build_prompt(profile: &Profile, shortlist: &[MatchResult]) -> String {
    let candidates: Vec<_> = shortlist
        .iter()
        .map(|entry| {
            json!({
                "title": entry.title,
                "reason": entry.reason,
                "eligibility": entry.eligibility,
            })
        })
        .collect();

    format!(
        "You are an expert in South African bursaries and scholarships.\n\n\
         Given this student profile and candidate bursaries, select the best {limit} candidates \
         and explain why each fits. Only choose from the candidates. Return strictly valid JSON \
         in this format:\n\n\
         [\n  {{\n    \"title\": \"Name of the bursary\",\n    \"reason\": \"Why this bursary fits the student\",\n    \"eligibility\": \"Eligibility criteria\"\n  }}\n]\n\n\
         Student profile: {profile}\n\
         Candidates: {candidates}\n",
        limit = ADVISORY_PICK_LIMIT,
        profile = serde_json::to_string(profile).unwrap_or_default(),
        candidates = serde_json::Value::Array(candidates),
    )
}
