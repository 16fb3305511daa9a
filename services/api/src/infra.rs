use bursary_match::config::AppConfig;
use bursary_match::error::AppError;
use bursary_match::matching::{
    AiRerankAdapter, CatalogImporter, Clock, FixedClock, HttpRerankService,
    InMemoryOpportunityStore, MatchOrchestrator, ShortlistSelector,
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store seeded from the catalog at `path`, or empty when no catalog is configured.
pub(crate) fn load_store(path: Option<&Path>) -> Result<InMemoryOpportunityStore, AppError> {
    let Some(path) = path else {
        info!("no opportunity catalog configured; starting with an empty collection");
        return Ok(InMemoryOpportunityStore::default());
    };

    let drafts = CatalogImporter::from_path(path)?;
    let imported = drafts.len();
    let store = InMemoryOpportunityStore::with_drafts(drafts)?;
    info!(path = %path.display(), imported, "opportunity catalog loaded");
    Ok(store)
}

/// Orchestrator wired from configuration; advisory reranking only when an endpoint is set.
pub(crate) fn build_orchestrator(config: &AppConfig) -> Result<MatchOrchestrator, AppError> {
    let orchestrator = MatchOrchestrator::new(ShortlistSelector::default(), config.matching);

    match HttpRerankService::from_config(&config.advisory)? {
        Some(service) => {
            info!(timeout_ms = config.advisory.timeout.as_millis() as u64, "advisory reranking enabled");
            Ok(orchestrator.with_advisor(AiRerankAdapter::new(
                Arc::new(service),
                config.advisory.timeout,
            )))
        }
        None => Ok(orchestrator),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Clock frozen at midnight UTC of `date`.
pub(crate) fn frozen_clock(date: NaiveDate) -> Arc<dyn Clock> {
    let midnight: DateTime<Utc> = date.and_time(chrono::NaiveTime::MIN).and_utc();
    Arc::new(FixedClock(midnight))
}
