//! Integration tests for the query_logs tool: workspace resolution, output
//! formatting, and the row limit.

mod common;

use azure_logs_mcp_server::error::LogsError;
use azure_logs_mcp_server::tools::{OutputFormat, QueryLogsInput, QueryToolHandler};
use common::{MockLogsClient, empty_response, engine_with, response_with_rows};
use serde_json::json;
use std::sync::Arc;

fn input(query: &str) -> QueryLogsInput {
    QueryLogsInput {
        workspace_id: None,
        query: query.to_string(),
        timespan: None,
        format: OutputFormat::Json,
        limit: None,
    }
}

#[tokio::test]
async fn test_query_logs_json_output_preserves_column_order() {
    let client = Arc::new(MockLogsClient::new());
    client
        .push_response(response_with_rows(
            &["TimeGenerated", "Computer", "Count"],
            vec![vec![json!("2024-05-01T00:00:00Z"), json!("web-01"), json!(3)]],
        ))
        .await;

    let handler = QueryToolHandler::new(engine_with(client.clone(), Some("ws-default")));
    let output = handler
        .query_logs(input("Heartbeat | take 1"))
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Computer"], json!("web-01"));

    // Keys stay in column order
    let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["TimeGenerated", "Computer", "Count"]);

    let recorded = client.recorded().await;
    assert_eq!(recorded[0].workspace_id, "ws-default");
    assert_eq!(recorded[0].query, "Heartbeat | take 1");
    assert_eq!(recorded[0].timespan, "PT1H");
}

#[tokio::test]
async fn test_query_logs_explicit_workspace_wins_over_default() {
    let client = Arc::new(MockLogsClient::new());
    client.push_response(empty_response(&["A"])).await;

    let handler = QueryToolHandler::new(engine_with(client.clone(), Some("ws-default")));
    let mut req = input("Heartbeat");
    req.workspace_id = Some("ws-explicit".to_string());
    handler.query_logs(req).await.unwrap();

    assert_eq!(client.recorded().await[0].workspace_id, "ws-explicit");
}

#[tokio::test]
async fn test_query_logs_blank_workspace_falls_back_to_default() {
    let client = Arc::new(MockLogsClient::new());
    client.push_response(empty_response(&["A"])).await;

    let handler = QueryToolHandler::new(engine_with(client.clone(), Some("ws-default")));
    let mut req = input("Heartbeat");
    req.workspace_id = Some("   ".to_string());
    handler.query_logs(req).await.unwrap();

    assert_eq!(client.recorded().await[0].workspace_id, "ws-default");
}

#[tokio::test]
async fn test_query_logs_missing_workspace_never_calls_remote() {
    let client = Arc::new(MockLogsClient::new());
    let handler = QueryToolHandler::new(engine_with(client.clone(), None));

    let err = handler.query_logs(input("Heartbeat")).await.unwrap_err();
    assert!(matches!(err, LogsError::MissingWorkspace));
    assert!(err.to_string().contains("AZURE_LOG_ANALYTICS_WORKSPACE_ID"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_query_logs_empty_result_returns_no_results_found() {
    let client = Arc::new(MockLogsClient::new());
    client.push_response(empty_response(&["A", "B"])).await;

    let handler = QueryToolHandler::new(engine_with(client, Some("ws")));
    let output = handler.query_logs(input("Heartbeat")).await.unwrap();
    assert_eq!(output, "No results found");
}

#[tokio::test]
async fn test_query_logs_csv_format() {
    let client = Arc::new(MockLogsClient::new());
    client
        .push_response(response_with_rows(
            &["name", "count"],
            vec![
                vec![json!("alpha"), json!(1)],
                vec![json!("beta, inc"), json!(0)],
            ],
        ))
        .await;

    let handler = QueryToolHandler::new(engine_with(client, Some("ws")));
    let mut req = input("T");
    req.format = OutputFormat::Csv;
    let output = handler.query_logs(req).await.unwrap();

    // Header unquoted, values always quoted, zero renders empty
    assert_eq!(output, "name,count\n\"alpha\",\"1\"\n\"beta, inc\",\"\"");
}

#[tokio::test]
async fn test_query_logs_table_format() {
    let client = Arc::new(MockLogsClient::new());
    client
        .push_response(response_with_rows(
            &["col", "value"],
            vec![vec![json!("x"), json!(10)]],
        ))
        .await;

    let handler = QueryToolHandler::new(engine_with(client, Some("ws")));
    let mut req = input("T");
    req.format = OutputFormat::Table;
    let output = handler.query_logs(req).await.unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "col | value");
    assert_eq!(lines[1], "----+------");
    assert_eq!(lines[2], "x   | 10   ");
}

#[tokio::test]
async fn test_query_logs_limit_truncates_rows() {
    let client = Arc::new(MockLogsClient::new());
    let rows: Vec<Vec<serde_json::Value>> = (0..50).map(|i| vec![json!(i + 1)]).collect();
    client.push_response(response_with_rows(&["n"], rows)).await;

    let handler = QueryToolHandler::new(engine_with(client, Some("ws")));
    let mut req = input("T");
    req.limit = Some(5);
    let output = handler.query_logs(req).await.unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 5);
    assert_eq!(parsed[0]["n"], json!(1));
    assert_eq!(parsed[4]["n"], json!(5));
}

#[tokio::test]
async fn test_query_logs_custom_timespan_forwarded() {
    let client = Arc::new(MockLogsClient::new());
    client.push_response(empty_response(&["A"])).await;

    let handler = QueryToolHandler::new(engine_with(client.clone(), Some("ws")));
    let mut req = input("Heartbeat");
    req.timespan = Some("P7D".to_string());
    handler.query_logs(req).await.unwrap();

    assert_eq!(client.recorded().await[0].timespan, "P7D");
}

#[tokio::test]
async fn test_query_logs_remote_failure_propagates() {
    let client = Arc::new(MockLogsClient::new());
    client
        .push_error(LogsError::query_failed(
            "The request had some invalid properties",
            Some("BadArgumentError".to_string()),
        ))
        .await;

    let handler = QueryToolHandler::new(engine_with(client, Some("ws")));
    let err = handler.query_logs(input("bad |")).await.unwrap_err();
    assert!(err.to_string().contains("invalid properties"));
}
