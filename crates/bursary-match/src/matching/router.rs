use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{OpportunityDraft, RawProfile};
use super::service::BursaryMatchService;
use super::store::{OpportunityStore, StoreError};

/// Body accepted by the match endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub profile: RawProfile,
    #[serde(default)]
    pub use_ai: bool,
}

/// Router builder exposing the match and catalog endpoints.
pub fn match_router<S>(service: Arc<BursaryMatchService<S>>) -> Router
where
    S: OpportunityStore + 'static,
{
    Router::new()
        .route("/api/v1/matches", post(match_handler::<S>))
        .route(
            "/api/v1/opportunities",
            get(list_handler::<S>).put(upsert_handler::<S>),
        )
        .with_state(service)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn match_handler<S>(
    State(service): State<Arc<BursaryMatchService<S>>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    S: OpportunityStore + 'static,
{
    match service.recommend(&request.profile, request.use_ai).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    }
}

pub(crate) async fn list_handler<S>(State(service): State<Arc<BursaryMatchService<S>>>) -> Response
where
    S: OpportunityStore + 'static,
{
    match service.opportunities() {
        Ok(opportunities) => (StatusCode::OK, axum::Json(opportunities)).into_response(),
        Err(error @ StoreError::Unavailable(_)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, error.to_string())
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn upsert_handler<S>(
    State(service): State<Arc<BursaryMatchService<S>>>,
    axum::Json(draft): axum::Json<OpportunityDraft>,
) -> Response
where
    S: OpportunityStore + 'static,
{
    match service.upsert(draft) {
        Ok(opportunity) => (StatusCode::OK, axum::Json(opportunity)).into_response(),
        Err(error @ StoreError::EmptyTitle) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        Err(error @ StoreError::Unavailable(_)) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, error.to_string())
        }
    }
}
