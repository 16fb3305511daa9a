use chrono::{DateTime, Utc};
use tracing::debug;

use super::domain::{MatchResult, Opportunity, Profile, ScoreResult};
use super::eligibility;
use super::scoring::ScoringEngine;

/// Number of entries the soft-match fallback always returns at most.
pub const SOFT_MATCH_LIMIT: usize = 3;

const NOT_AVAILABLE: &str = "n/a";

fn format_deadline(deadline: Option<DateTime<Utc>>) -> String {
    deadline
        .map(|instant| instant.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn eligibility_summary(opportunity: &Opportunity) -> String {
    let minimum = opportunity
        .min_average
        .map(|value| value.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let years = opportunity
        .eligible_years
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Min avg: {} | Years: {} | Provinces: {} | Deadline: {}",
        minimum,
        years,
        opportunity.provinces.label(),
        format_deadline(opportunity.deadline)
    )
}

fn ranked<'a>(
    engine: &ScoringEngine,
    profile: &Profile,
    candidates: Vec<&'a Opportunity>,
    now: DateTime<Utc>,
) -> Vec<(&'a Opportunity, ScoreResult)> {
    let mut scored: Vec<_> = candidates
        .into_iter()
        .map(|opportunity| (opportunity, engine.score(profile, opportunity, now)))
        .collect();
    // `sort_by` is stable, so equal scores keep collection order.
    scored.sort_by(|(_, left), (_, right)| right.score.cmp(&left.score));
    scored
}

/// Builds the rule-based shortlist, degrading to a soft match when nothing is eligible.
#[derive(Debug, Clone, Default)]
pub struct ShortlistSelector {
    engine: ScoringEngine,
}

impl ShortlistSelector {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }

    pub fn select(
        &self,
        profile: &Profile,
        opportunities: &[Opportunity],
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<MatchResult> {
        let open: Vec<&Opportunity> = opportunities
            .iter()
            .filter(|opportunity| opportunity.deadline.map_or(true, |deadline| deadline >= now))
            .collect();

        if open.len() < opportunities.len() {
            debug!(
                dropped = opportunities.len() - open.len(),
                "skipping opportunities with passed deadlines"
            );
        }

        if open.is_empty() {
            return Vec::new();
        }

        let (eligible, ineligible): (Vec<&Opportunity>, Vec<&Opportunity>) = open
            .iter()
            .copied()
            .partition(|opportunity| eligibility::check(profile, opportunity, now).passed);

        if eligible.is_empty() {
            debug!(
                candidates = ineligible.len(),
                "no eligible opportunities; falling back to soft match"
            );
            return ranked(&self.engine, profile, open, now)
                .into_iter()
                .take(SOFT_MATCH_LIMIT)
                .map(|(opportunity, result)| soft_match_result(opportunity, result))
                .collect();
        }

        ranked(&self.engine, profile, eligible, now)
            .into_iter()
            .take(limit)
            .map(|(opportunity, result)| eligible_result(opportunity, result))
            .collect()
    }
}

fn eligible_result(opportunity: &Opportunity, result: ScoreResult) -> MatchResult {
    let notes = if result.notes.is_empty() {
        "Good fit".to_string()
    } else {
        result.notes.join("; ")
    };

    MatchResult {
        title: opportunity.title.clone(),
        reason: format!("Score {}. {}", result.score, notes),
        eligibility: eligibility_summary(opportunity),
        url: opportunity.url.clone(),
    }
}

fn soft_match_result(opportunity: &Opportunity, result: ScoreResult) -> MatchResult {
    let notes = if result.notes.is_empty() {
        "Closest available option".to_string()
    } else {
        result.notes.join("; ")
    };

    MatchResult {
        title: opportunity.title.clone(),
        reason: format!("Score {} (partial match). {}", result.score, notes),
        eligibility: format!("Deadline: {}", format_deadline(opportunity.deadline)),
        url: opportunity.url.clone(),
    }
}
