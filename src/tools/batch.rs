//! Batch query execution with per-item failure isolation.
//!
//! Items run strictly sequentially in input order: item N+1 never starts
//! before item N's result is recorded. A failing item contributes an
//! `Error: ...` string to its slot in the output mapping and never aborts
//! the remaining items.

use crate::error::LogsResult;
use crate::models::{DEFAULT_ROW_LIMIT, DEFAULT_TIMESPAN};
use crate::tools::format::OutputFormat;
use crate::tools::query::QueryEngine;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// One query specification within a batch call.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchQueryItem {
    /// Identifier for this item's slot in the result mapping. Duplicate IDs
    /// within one batch overwrite earlier results.
    pub id: String,
    /// KQL query to execute (forwarded verbatim)
    pub query: String,
    /// ISO-8601 time range for this item. Default: PT1H
    #[serde(default)]
    pub timespan: Option<String>,
}

/// Input for the query_logs_batch tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchQueryInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Queries to execute, in order
    pub queries: Vec<BatchQueryItem>,
    /// Output format applied to every item: json (default), csv, or table
    #[serde(default)]
    pub format: OutputFormat,
}

/// Handler for the query_logs_batch tool.
pub struct BatchToolHandler {
    engine: QueryEngine,
}

impl BatchToolHandler {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    /// Execute the batch and return the id -> text mapping as pretty JSON.
    ///
    /// The workspace is resolved once up front: a missing workspace fails the
    /// whole call before any remote query is issued.
    pub async fn query_logs_batch(&self, input: BatchQueryInput) -> LogsResult<String> {
        let results = self
            .execute_batch(input.workspace_id.as_deref(), input.queries, input.format)
            .await?;
        serde_json::to_string_pretty(&JsonValue::Object(results))
            .map_err(|e| crate::error::LogsError::internal(e.to_string()))
    }

    /// Execute the batch, returning the raw result mapping.
    pub async fn execute_batch(
        &self,
        workspace: Option<&str>,
        items: Vec<BatchQueryItem>,
        format: OutputFormat,
    ) -> LogsResult<serde_json::Map<String, JsonValue>> {
        let workspace_id = self.engine.resolve_workspace(workspace)?.to_string();

        let mut results = serde_json::Map::new();
        for item in items {
            let timespan = item.timespan.as_deref().unwrap_or(DEFAULT_TIMESPAN);
            debug!(id = %item.id, timespan = %timespan, "Executing batch item");

            let slot = match self
                .engine
                .execute(
                    Some(&workspace_id),
                    &item.query,
                    timespan,
                    format,
                    DEFAULT_ROW_LIMIT,
                )
                .await
            {
                Ok(text) => JsonValue::String(text),
                Err(e) => {
                    warn!(id = %item.id, error = %e, "Batch item failed");
                    JsonValue::String(format!("Error: {}", e))
                }
            };
            results.insert(item.id, slot);
        }

        Ok(results)
    }
}
