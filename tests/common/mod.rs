//! Shared test helpers: a scripted mock query client and response builders.

use async_trait::async_trait;
use azure_logs_mcp_server::client::LogsClient;
use azure_logs_mcp_server::error::{LogsError, LogsResult};
use azure_logs_mcp_server::models::{LogsColumn, LogsQueryResponse, LogsTable};
use azure_logs_mcp_server::tools::QueryEngine;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// One recorded call to the mock client.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub workspace_id: String,
    pub query: String,
    pub timespan: String,
}

/// Scripted in-memory client: pops one prepared result per call and records
/// everything it was asked.
pub struct MockLogsClient {
    script: Mutex<VecDeque<LogsResult<LogsQueryResponse>>>,
    calls: Mutex<Vec<RecordedQuery>>,
    call_count: AtomicUsize,
}

impl MockLogsClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Queue a successful response.
    pub async fn push_response(&self, response: LogsQueryResponse) {
        self.script.lock().await.push_back(Ok(response));
    }

    /// Queue a failure.
    pub async fn push_error(&self, error: LogsError) {
        self.script.lock().await.push_back(Err(error));
    }

    /// Number of queries the mock has served.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Everything the mock was asked, in call order.
    pub async fn recorded(&self) -> Vec<RecordedQuery> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockLogsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogsClient for MockLogsClient {
    async fn query(
        &self,
        workspace_id: &str,
        query: &str,
        timespan: &str,
    ) -> LogsResult<LogsQueryResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().await.push(RecordedQuery {
            workspace_id: workspace_id.to_string(),
            query: query.to_string(),
            timespan: timespan.to_string(),
        });

        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(LogsQueryResponse::default()))
    }
}

/// Build a one-table response from column names and row values.
pub fn response_with_rows(columns: &[&str], rows: Vec<Vec<JsonValue>>) -> LogsQueryResponse {
    LogsQueryResponse {
        tables: vec![LogsTable {
            name: "PrimaryResult".to_string(),
            columns: columns.iter().map(|c| LogsColumn::new(*c)).collect(),
            rows,
        }],
    }
}

/// A response with the right shape but zero rows.
pub fn empty_response(columns: &[&str]) -> LogsQueryResponse {
    response_with_rows(columns, Vec::new())
}

/// Build an engine over the given mock with an optional default workspace.
pub fn engine_with(client: Arc<MockLogsClient>, default_workspace: Option<&str>) -> QueryEngine {
    QueryEngine::new(client, default_workspace.map(str::to_string))
}
