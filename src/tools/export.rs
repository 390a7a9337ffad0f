//! Export query results to a local file.
//!
//! Unlike query_logs, export writes every returned row (no row limit) so the
//! file is a complete snapshot of what the query matched.

use crate::error::{LogsError, LogsResult};
use crate::tools::format::{OutputFormat, flatten_tables, format_records};
use crate::tools::query::QueryEngine;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

const EXPORT_TIMESPAN: &str = "PT24H";

/// File format for exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// CSV with a header line (default)
    #[default]
    Csv,
    /// Pretty-printed JSON array
    Json,
}

/// Input for the export_results tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExportResultsInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// KQL query to execute (forwarded verbatim)
    pub query: String,
    /// Output file path
    pub filename: String,
    /// File format: csv (default) or json
    #[serde(default)]
    pub format: ExportFormat,
}

/// Handler for the export_results tool.
pub struct ExportToolHandler {
    engine: QueryEngine,
}

impl ExportToolHandler {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    pub async fn export_results(&self, input: ExportResultsInput) -> LogsResult<String> {
        let response = self
            .engine
            .run_raw(input.workspace_id.as_deref(), &input.query, EXPORT_TIMESPAN)
            .await?;

        let records = flatten_tables(&response);
        if records.is_empty() {
            return Ok("No results to export".to_string());
        }

        let row_count = records.len();
        let content = match input.format {
            ExportFormat::Csv => format_records(records, OutputFormat::Csv, row_count),
            ExportFormat::Json => format_records(records, OutputFormat::Json, row_count),
        };

        tokio::fs::write(&input.filename, content)
            .await
            .map_err(|e| {
                LogsError::internal(format!("failed to write {}: {}", input.filename, e))
            })?;

        info!(filename = %input.filename, rows = row_count, "Exported query results");
        Ok(format!(
            "Results exported to {} ({} rows)",
            input.filename, row_count
        ))
    }
}
