//! Optional advisory reranking of the rule-based shortlist by an external text-generation
//! service. Every failure here is recovered locally; callers only ever observe a downgrade
//! in provenance.

mod adapter;
mod http;
mod response;

use std::time::Duration;

use async_trait::async_trait;

pub use adapter::{AiRerankAdapter, Reranked, ADVISORY_PICK_LIMIT};
pub use http::HttpRerankService;
pub use response::AdvisoryPick;

/// Port for the external "prompt in, free text out" call.
#[async_trait]
pub trait AdvisoryRerankService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError>;
}

/// Failure modes of the advisory step.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("advisory transport failed: {0}")]
    Transport(String),
    #[error("advisory service responded with status {status}")]
    Status { status: u16 },
    #[error("advisory service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("advisory response did not contain a JSON array")]
    Malformed,
    #[error("advisory client could not be built: {0}")]
    Client(String),
}
