use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{AdvisoryError, AdvisoryRerankService};
use crate::config::AdvisoryConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

/// Text-generation endpoint accepting `{prompt, temperature, maxOutputTokens}` and answering
/// with `{"candidates": [{"output": "..."}]}`.
#[derive(Debug, Clone)]
pub struct HttpRerankService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    temperature: f32,
    max_output_tokens: u32,
}

impl HttpRerankService {
    pub fn new(endpoint: impl Into<String>, config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        // Matches the adapter deadline so abandoned requests do not linger.
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AdvisoryError::Client(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Build a service when an endpoint is configured.
    pub fn from_config(config: &AdvisoryConfig) -> Result<Option<Self>, AdvisoryError> {
        config
            .endpoint
            .as_deref()
            .map(|endpoint| Self::new(endpoint, config))
            .transpose()
    }
}

/// Pull `candidates[0].output` out of the response envelope.
///
/// Bodies that are not JSON are handed back untouched so the adapter's parser decides;
/// a JSON envelope without output text reads as an empty array.
pub(crate) fn extract_output(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(envelope)) => envelope
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("output"))
            .and_then(Value::as_str)
            .unwrap_or("[]")
            .to_string(),
        _ => body.to_string(),
    }
}

#[async_trait]
impl AdvisoryRerankService for HttpRerankService {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let mut request = self.client.post(&self.endpoint).json(&GenerateRequest {
            prompt,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;
        debug!(endpoint = %self.endpoint, "advisory endpoint answered");

        Ok(extract_output(&body))
    }
}
