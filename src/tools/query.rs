//! Query execution engine and the `query_logs` tool.
//!
//! `QueryEngine` composes workspace resolution, the remote client, the row
//! normalizer, and the result formatter. Every query-shaped tool in the
//! server funnels through it.

use crate::client::LogsClient;
use crate::error::{LogsError, LogsResult};
use crate::models::{DEFAULT_ROW_LIMIT, DEFAULT_TIMESPAN, LogsQueryResponse};
use crate::tools::format::{OutputFormat, flatten_tables, format_records};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Literal response for queries that match nothing. A valid result, not an
/// error.
pub const NO_RESULTS: &str = "No results found";

/// Shared query execution engine.
#[derive(Clone)]
pub struct QueryEngine {
    client: Arc<dyn LogsClient>,
    default_workspace: Option<String>,
}

impl QueryEngine {
    pub fn new(client: Arc<dyn LogsClient>, default_workspace: Option<String>) -> Self {
        Self {
            client,
            default_workspace,
        }
    }

    /// Resolve a workspace ID: explicit non-blank argument, else the
    /// configured default, else `MissingWorkspace`.
    pub fn resolve_workspace<'a>(&'a self, explicit: Option<&'a str>) -> LogsResult<&'a str> {
        explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(self.default_workspace.as_deref())
            .ok_or(LogsError::MissingWorkspace)
    }

    /// Run a query and return the raw tabular response.
    pub async fn run_raw(
        &self,
        workspace: Option<&str>,
        query: &str,
        timespan: &str,
    ) -> LogsResult<LogsQueryResponse> {
        let workspace_id = self.resolve_workspace(workspace)?;
        self.client.query(workspace_id, query, timespan).await
    }

    /// Run a query and return formatted text.
    ///
    /// Zero tables, or tables with zero rows, yield the literal
    /// "No results found". The limit is applied before formatting.
    pub async fn execute(
        &self,
        workspace: Option<&str>,
        query: &str,
        timespan: &str,
        format: OutputFormat,
        limit: usize,
    ) -> LogsResult<String> {
        let response = self.run_raw(workspace, query, timespan).await?;

        let records = flatten_tables(&response);
        if records.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        info!(
            row_count = records.len(),
            limit = limit,
            format = ?format,
            "Query executed"
        );

        Ok(format_records(records, format, limit))
    }
}

/// Input for the query_logs tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryLogsInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// KQL query to execute (forwarded verbatim)
    pub query: String,
    /// ISO-8601 time range, e.g. PT1H, P1D. Default: PT1H
    #[serde(default)]
    pub timespan: Option<String>,
    /// Output format: json (default), csv, or table
    #[serde(default)]
    pub format: OutputFormat,
    /// Maximum rows to return. Default: 1000
    #[serde(default)]
    pub limit: Option<u32>,
}

impl QueryLogsInput {
    /// Effective row limit: positive, defaulting to 1000.
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            Some(n) if n > 0 => n as usize,
            _ => DEFAULT_ROW_LIMIT,
        }
    }

    pub fn effective_timespan(&self) -> &str {
        self.timespan.as_deref().unwrap_or(DEFAULT_TIMESPAN)
    }
}

/// Handler for the query_logs tool.
pub struct QueryToolHandler {
    engine: QueryEngine,
}

impl QueryToolHandler {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    pub async fn query_logs(&self, input: QueryLogsInput) -> LogsResult<String> {
        self.engine
            .execute(
                input.workspace_id.as_deref(),
                &input.query,
                input.effective_timespan(),
                input.format,
                input.effective_limit(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_defaults() {
        let input: QueryLogsInput =
            serde_json::from_str(r#"{"query": "Heartbeat | take 5"}"#).unwrap();
        assert!(input.workspace_id.is_none());
        assert_eq!(input.effective_timespan(), "PT1H");
        assert_eq!(input.effective_limit(), 1000);
        assert_eq!(input.format, OutputFormat::Json);
    }

    #[test]
    fn test_zero_limit_falls_back_to_default() {
        let input: QueryLogsInput =
            serde_json::from_str(r#"{"query": "Heartbeat", "limit": 0}"#).unwrap();
        assert_eq!(input.effective_limit(), 1000);
    }

    #[test]
    fn test_format_deserialization() {
        let input: QueryLogsInput =
            serde_json::from_str(r#"{"query": "Heartbeat", "format": "table"}"#).unwrap();
        assert_eq!(input.format, OutputFormat::Table);
    }
}
