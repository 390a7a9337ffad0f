//! Row normalization and output formatting.
//!
//! `flatten_tables` turns a multi-table query response into one ordered
//! sequence of column->value records. `format_records` renders a record
//! sequence as pretty JSON, CSV, or an aligned text table. The row limit is
//! applied here, strictly before any rendering.

use crate::models::{LogsQueryResponse, RowRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use unicode_width::UnicodeWidthStr;

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON array (default)
    #[default]
    Json,
    /// CSV with a header line and quoted values
    Csv,
    /// Aligned text table
    Table,
}

/// Flatten all tables of a response into row records.
///
/// Rows are concatenated in table order, then row order. Within a record,
/// duplicate column names are last-write-wins. Ragged rows are tolerated:
/// values beyond the column list are dropped, missing values stay absent.
pub fn flatten_tables(response: &LogsQueryResponse) -> Vec<RowRecord> {
    let mut records = Vec::with_capacity(response.row_count());
    for table in &response.tables {
        for row in &table.rows {
            let mut record = RowRecord::new();
            for (column, value) in table.columns.iter().zip(row.iter()) {
                record.insert(column.name.clone(), value.clone());
            }
            records.push(record);
        }
    }
    records
}

/// Render `records` in the requested format, truncated to `limit` rows first.
///
/// An empty sequence renders as the empty string; callers are expected to
/// have handled the "No results found" case already.
pub fn format_records(records: Vec<RowRecord>, format: OutputFormat, limit: usize) -> String {
    let limited: Vec<RowRecord> = records.into_iter().take(limit.max(1)).collect();
    if limited.is_empty() {
        return String::new();
    }

    match format {
        OutputFormat::Json => format_as_json(&limited),
        OutputFormat::Csv => format_as_csv(&limited),
        OutputFormat::Table => format_as_table(&limited),
    }
}

fn format_as_json(records: &[RowRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_default()
}

/// Render a cell value for CSV and table output.
///
/// Missing and falsy values (null, false, zero, empty string) render as the
/// empty string; nested arrays and objects render as compact JSON.
fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(false) => String::new(),
        JsonValue::Bool(true) => "true".to_string(),
        JsonValue::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

/// Quote a CSV field, doubling embedded quotes.
fn quote_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Column order comes from the first record; later records' extra keys are
/// dropped and missing keys render as empty fields.
fn format_as_csv(records: &[RowRecord]) -> String {
    let headers: Vec<&String> = records[0].keys().collect();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| h.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );

    for record in records {
        let line: Vec<String> = headers
            .iter()
            .map(|h| {
                let cell = record.get(*h).map(display_value).unwrap_or_default();
                quote_csv(&cell)
            })
            .collect();
        lines.push(line.join(","));
    }

    lines.join("\n")
}

/// Left-align `text` to `width` by display width, not char count, so wide
/// characters (CJK, emoji) keep columns aligned.
fn pad_cell(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(pad))
}

/// Aligned text table: header, dash separator, data rows. Each column is as
/// wide as its widest cell or header, cells left-aligned, columns joined
/// with " | " (separator joined with "-+-").
fn format_as_table(records: &[RowRecord]) -> String {
    let headers: Vec<String> = records[0].keys().cloned().collect();

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|h| record.get(h).map(display_value).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let value_width = rows.iter().map(|r| r[i].width()).max().unwrap_or(0);
            h.width().max(value_width)
        })
        .collect();

    let header_row = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad_cell(h, *w))
        .collect::<Vec<_>>()
        .join(" | ");

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = vec![header_row, separator];
    for row in &rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad_cell(cell, *w))
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(line);
    }

    lines.join("\n")
}
