//! Connectivity diagnostic tool.
//!
//! `test_connectivity` never fails: both success and failure are rendered as
//! structured records distinguished by their `status` field, and a missing
//! workspace yields a configuration hint rather than an error.

use crate::tools::query::QueryEngine;
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimal one-row probe; result content is irrelevant.
const PROBE_QUERY: &str = "print 1";
const PROBE_TIMESPAN: &str = "PT5M";

/// Input for the test_connectivity tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TestConnectivityInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConnectivitySuccess<'a> {
    status: &'static str,
    workspace_id: &'a str,
    message: &'static str,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ConnectivityFailure<'a> {
    status: &'static str,
    workspace_id: &'a str,
    error: String,
    error_code: String,
    timestamp: String,
}

/// Handler for the test_connectivity tool.
pub struct ConnectivityToolHandler {
    engine: QueryEngine,
}

impl ConnectivityToolHandler {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    /// Probe the workspace. Always returns text; never an error.
    pub async fn test_connectivity(&self, input: TestConnectivityInput) -> String {
        let workspace_id = match self.engine.resolve_workspace(input.workspace_id.as_deref()) {
            Ok(id) => id.to_string(),
            Err(_) => {
                return "No workspace configured. Pass a workspace_id argument or set \
                        AZURE_LOG_ANALYTICS_WORKSPACE_ID to enable connectivity checks."
                    .to_string();
            }
        };

        debug!(workspace_id = %workspace_id, "Running connectivity probe");

        let timestamp = Utc::now().to_rfc3339();
        match self
            .engine
            .run_raw(Some(&workspace_id), PROBE_QUERY, PROBE_TIMESPAN)
            .await
        {
            Ok(_) => serde_json::to_string_pretty(&ConnectivitySuccess {
                status: "ok",
                workspace_id: &workspace_id,
                message: "Workspace is reachable and accepted the probe query",
                timestamp,
            })
            .unwrap_or_default(),
            Err(e) => serde_json::to_string_pretty(&ConnectivityFailure {
                status: "error",
                workspace_id: &workspace_id,
                error: e.to_string(),
                error_code: e.error_code().unwrap_or("Unknown").to_string(),
                timestamp,
            })
            .unwrap_or_default(),
        }
    }
}
