//! Remote query client for the Log Analytics REST API.
//!
//! `LogsClient` is the seam between the tool handlers and the remote service:
//! handlers depend on the trait, so tests can substitute a scripted client.
//! `LogAnalyticsClient` is the production implementation over the workspace
//! query endpoint (`POST /v1/workspaces/{id}/query`). KQL is forwarded
//! verbatim; this layer never inspects the query text.

use crate::auth::TokenProvider;
use crate::error::{LogsError, LogsResult};
use crate::models::LogsQueryResponse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Capability of executing one KQL query against a named workspace.
#[async_trait]
pub trait LogsClient: Send + Sync {
    /// Execute `query` against `workspace_id` over the ISO-8601 `timespan`.
    async fn query(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: &str,
    ) -> LogsResult<LogsQueryResponse>;
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    timespan: &'a str,
}

/// Error body shape returned by the Log Analytics service.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: ServiceError,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Production client over the Log Analytics REST API.
pub struct LogAnalyticsClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    endpoint: String,
}

impl LogAnalyticsClient {
    /// Create a client against `endpoint` (no trailing slash).
    pub fn new(tokens: TokenProvider, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            tokens,
            endpoint: endpoint.into(),
        }
    }

    fn query_url(&self, workspace_id: &str) -> String {
        format!("{}/v1/workspaces/{}/query", self.endpoint, workspace_id)
    }
}

#[async_trait]
impl LogsClient for LogAnalyticsClient {
    async fn query(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: &str,
    ) -> LogsResult<LogsQueryResponse> {
        let token = self.tokens.access_token().await?;

        debug!(workspace_id = %workspace_id, timespan = %timespan, "Executing workspace query");

        let response = self
            .http
            .post(self.query_url(workspace_id))
            .bearer_auth(token)
            .json(&QueryBody { query, timespan })
            .send()
            .await
            .map_err(|e| LogsError::query_failed(e.to_string(), None))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (message, code) = match serde_json::from_str::<ServiceErrorBody>(&body) {
                Ok(parsed) => (
                    parsed
                        .error
                        .message
                        .unwrap_or_else(|| format!("service returned {}", status)),
                    parsed.error.code,
                ),
                Err(_) => (format!("service returned {}: {}", status, body), None),
            };
            return Err(LogsError::query_failed(message, code));
        }

        response
            .json::<LogsQueryResponse>()
            .await
            .map_err(|e| LogsError::query_failed(format!("malformed response body: {}", e), None))
    }
}
