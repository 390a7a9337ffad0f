//! Query-related data models.
//!
//! This module defines the tabular result shape returned by the Log Analytics
//! REST API. The server never interprets the KQL itself; it only reshapes the
//! tables the service returns.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default row limit applied before formatting.
pub const DEFAULT_ROW_LIMIT: usize = 1000;

/// Default ISO-8601 timespan for queries that do not specify one.
pub const DEFAULT_TIMESPAN: &str = "PT1H";

/// A single flattened result row: column name -> value, in column order.
///
/// With serde_json's `preserve_order` feature this keeps keys in
/// first-encountered order, which the formatters rely on.
pub type RowRecord = serde_json::Map<String, JsonValue>;

/// A column descriptor in a Log Analytics result table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsColumn {
    pub name: String,
    /// KQL data type (e.g. "string", "datetime", "long")
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
}

impl LogsColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: None,
        }
    }
}

/// One table in a Log Analytics query response.
///
/// Every row array has exactly as many values as there are columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsTable {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<LogsColumn>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl LogsTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The full response body from the workspace query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogsQueryResponse {
    #[serde(default)]
    pub tables: Vec<LogsTable>,
}

impl LogsQueryResponse {
    /// True if the response carries no rows at all.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(LogsTable::is_empty)
    }

    /// Total row count across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "tables": [{
                "name": "PrimaryResult",
                "columns": [{"name": "TimeGenerated", "type": "datetime"}, {"name": "Count", "type": "long"}],
                "rows": [["2024-01-01T00:00:00Z", 42]]
            }]
        }"#;

        let response: LogsQueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.tables.len(), 1);
        assert_eq!(response.tables[0].columns[1].name, "Count");
        assert_eq!(response.tables[0].rows[0][1], json!(42));
        assert!(!response.is_empty());
        assert_eq!(response.row_count(), 1);
    }

    #[test]
    fn test_empty_response() {
        let response: LogsQueryResponse = serde_json::from_str("{}").unwrap();
        assert!(response.is_empty());

        let response = LogsQueryResponse {
            tables: vec![LogsTable {
                name: "PrimaryResult".to_string(),
                columns: vec![LogsColumn::new("A")],
                rows: Vec::new(),
            }],
        };
        assert!(response.is_empty());
        assert_eq!(response.row_count(), 0);
    }
}
