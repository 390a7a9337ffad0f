//! Workspace discovery tools: list_tables and get_table_schema.
//!
//! Both issue fixed KQL probes; the table name in get_table_schema is spliced
//! into the query verbatim, like every other query string in this server.

use crate::error::LogsResult;
use crate::tools::format::flatten_tables;
use crate::tools::query::QueryEngine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const LIST_TABLES_QUERY: &str = "search * | distinct $table | sort by $table asc";
const LIST_TABLES_TIMESPAN: &str = "P30D";
const SCHEMA_TIMESPAN: &str = "P1D";

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
}

/// Input for the get_table_schema tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTableSchemaInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Table to describe, e.g. SigninLogs
    pub table_name: String,
}

/// Handler for the workspace discovery tools.
pub struct SchemaToolHandler {
    engine: QueryEngine,
}

impl SchemaToolHandler {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    /// List tables that held data in the last 30 days.
    pub async fn list_tables(&self, input: ListTablesInput) -> LogsResult<String> {
        let response = self
            .engine
            .run_raw(
                input.workspace_id.as_deref(),
                LIST_TABLES_QUERY,
                LIST_TABLES_TIMESPAN,
            )
            .await?;

        let tables: Vec<String> = response
            .tables
            .first()
            .map(|t| {
                t.rows
                    .iter()
                    .filter_map(|row| row.first())
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        #[derive(Serialize)]
        struct TableList {
            tables: Vec<String>,
        }

        serde_json::to_string_pretty(&TableList { tables })
            .map_err(|e| crate::error::LogsError::internal(e.to_string()))
    }

    /// Describe one table's columns via getschema.
    pub async fn get_table_schema(&self, input: GetTableSchemaInput) -> LogsResult<String> {
        let query = format!(
            "{} | getschema | project ColumnName, DataType, ColumnType",
            input.table_name
        );
        let response = self
            .engine
            .run_raw(input.workspace_id.as_deref(), &query, SCHEMA_TIMESPAN)
            .await?;

        let schema = flatten_tables(&response);
        if schema.is_empty() {
            return Ok(format!("No schema found for table {}", input.table_name));
        }

        #[derive(Serialize)]
        struct TableSchema<'a> {
            table: &'a str,
            schema: Vec<crate::models::RowRecord>,
        }

        serde_json::to_string_pretty(&TableSchema {
            table: &input.table_name,
            schema,
        })
        .map_err(|e| crate::error::LogsError::internal(e.to_string()))
    }
}
