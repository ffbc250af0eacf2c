//! # Transport
//!
//! The one outbound request the client makes. Front-ends hold an
//! `Arc<dyn AnalysisTransport>` so tests can swap in a fake.

use async_trait::async_trait;
use serde_json::Value;

use crate::analysis::AnalyzeRequest;
use crate::config::ClientConfig;
use crate::errors::{AssistError, AssistResult};

/// Sends code to the analysis service and returns the parsed response body.
///
/// Implementations only fail when no usable JSON came back; deciding whether
/// the JSON is a success is [`AnalysisResult::from_response`]'s job.
///
/// [`AnalysisResult::from_response`]: crate::analysis::AnalysisResult::from_response
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest) -> AssistResult<Value>;

    /// Where requests go, for display
    fn endpoint(&self) -> &str;
}

/// reqwest-backed transport for the hosted service.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a client from validated config.
    pub fn new(config: &ClientConfig) -> AssistResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| AssistError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn analyze(&self, request: &AnalyzeRequest) -> AssistResult<Value> {
        tracing::debug!(endpoint = %self.endpoint, bytes = request.code.len(), "sending analyze request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AssistError::network(e.to_string()))?;

        // Error statuses still carry a body worth showing, so keep going.
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "analysis service returned an error status");
        }

        let body = response
            .text()
            .await
            .map_err(|e| AssistError::network(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            AssistError::invalid_response(format!("{} (HTTP {}): {}", e, status.as_u16(), snippet(&body)))
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// First line of a body, cut short for error messages
fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 80;
    let first_line = body.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > MAX_CHARS {
        let cut: String = first_line.chars().take(MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}
