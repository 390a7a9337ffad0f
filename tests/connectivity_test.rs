//! Integration tests for the test_connectivity diagnostic.

mod common;

use azure_logs_mcp_server::error::LogsError;
use azure_logs_mcp_server::tools::{ConnectivityToolHandler, TestConnectivityInput};
use common::{MockLogsClient, engine_with, response_with_rows};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_connectivity_success_record() {
    let client = Arc::new(MockLogsClient::new());
    client
        .push_response(response_with_rows(&["print_0"], vec![vec![json!(1)]]))
        .await;

    let handler = ConnectivityToolHandler::new(engine_with(client.clone(), Some("ws-1")));
    let output = handler
        .test_connectivity(TestConnectivityInput { workspace_id: None })
        .await;

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["status"], json!("ok"));
    assert_eq!(parsed["workspace_id"], json!("ws-1"));
    assert!(parsed["timestamp"].is_string());

    // The probe is a fixed minimal query
    let recorded = client.recorded().await;
    assert_eq!(recorded[0].query, "print 1");
    assert_eq!(recorded[0].timespan, "PT5M");
}

#[tokio::test]
async fn test_connectivity_failure_is_a_record_not_an_error() {
    let client = Arc::new(MockLogsClient::new());
    client
        .push_error(LogsError::query_failed(
            "workspace not found",
            Some("WorkspaceNotFoundError".to_string()),
        ))
        .await;

    let handler = ConnectivityToolHandler::new(engine_with(client, Some("ws-1")));
    let output = handler
        .test_connectivity(TestConnectivityInput { workspace_id: None })
        .await;

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["status"], json!("error"));
    assert_eq!(parsed["error_code"], json!("WorkspaceNotFoundError"));
    assert!(
        parsed["error"]
            .as_str()
            .unwrap()
            .contains("workspace not found")
    );
}

#[tokio::test]
async fn test_connectivity_failure_without_code_reports_unknown() {
    let client = Arc::new(MockLogsClient::new());
    client.push_error(LogsError::auth("token rejected")).await;

    let handler = ConnectivityToolHandler::new(engine_with(client, Some("ws-1")));
    let output = handler
        .test_connectivity(TestConnectivityInput { workspace_id: None })
        .await;

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["status"], json!("error"));
    assert_eq!(parsed["error_code"], json!("Unknown"));
}

#[tokio::test]
async fn test_connectivity_without_workspace_gives_guidance() {
    let client = Arc::new(MockLogsClient::new());
    let handler = ConnectivityToolHandler::new(engine_with(client.clone(), None));

    let output = handler
        .test_connectivity(TestConnectivityInput { workspace_id: None })
        .await;

    assert!(output.contains("AZURE_LOG_ANALYTICS_WORKSPACE_ID"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_connectivity_explicit_workspace() {
    let client = Arc::new(MockLogsClient::new());
    client
        .push_response(response_with_rows(&["print_0"], vec![vec![json!(1)]]))
        .await;

    let handler = ConnectivityToolHandler::new(engine_with(client.clone(), None));
    let output = handler
        .test_connectivity(TestConnectivityInput {
            workspace_id: Some("ws-explicit".to_string()),
        })
        .await;

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["workspace_id"], json!("ws-explicit"));
    assert_eq!(client.recorded().await[0].workspace_id, "ws-explicit");
}
