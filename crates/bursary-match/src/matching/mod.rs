//! Bursary and scholarship matching.
//!
//! A raw intake profile is normalized, every opportunity is checked against the hard
//! eligibility rules and scored, and the best candidates are shortlisted. The shortlist can
//! optionally be reranked by an external advisory service; any failure there falls back to
//! the rule-based order.

pub mod advisory;
pub mod catalog;
pub mod clock;
pub mod domain;
pub mod eligibility;
pub mod normalizer;
pub mod orchestrator;
pub mod router;
pub mod scoring;
pub mod selector;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use advisory::{
    AdvisoryError, AdvisoryPick, AdvisoryRerankService, AiRerankAdapter, HttpRerankService,
    Reranked, ADVISORY_PICK_LIMIT,
};
pub use catalog::{CatalogError, CatalogFormat, CatalogImporter};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    EligibilityCheck, IneligibilityReason, MatchOutcome, MatchResult, Opportunity,
    OpportunityDraft, OpportunityId, Profile, Provenance, ProvinceScope, RawProfile, RawValue,
    ScoreResult,
};
pub use eligibility::check;
pub use normalizer::{normalize, ProfileError, ProfileField};
pub use orchestrator::{MatchOrchestrator, MatchSettings};
pub use router::{match_router, MatchRequest};
pub use scoring::{ScoringConfig, ScoringEngine};
pub use selector::{ShortlistSelector, SOFT_MATCH_LIMIT};
pub use service::BursaryMatchService;
pub use store::{InMemoryOpportunityStore, OpportunityStore, StoreError};
