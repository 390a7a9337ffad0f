//! In-memory saved-query store and its tools.
//!
//! The store lives for the process lifetime and keeps insertion order:
//! re-saving an existing name overwrites the entry in place without moving
//! it. There is no persistence and no delete operation.

use crate::error::{LogsError, LogsResult};
use crate::models::{DEFAULT_ROW_LIMIT, DEFAULT_TIMESPAN, SavedQueryEntry};
use crate::tools::format::OutputFormat;
use crate::tools::query::QueryEngine;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Process-lifetime name -> query registry.
#[derive(Default)]
pub struct SavedQueryStore {
    entries: RwLock<Vec<SavedQueryEntry>>,
}

impl SavedQueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry. Overwriting keeps the original position.
    pub async fn save(&self, name: &str, query: &str, description: &str) {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                existing.query = query.to_string();
                existing.description = description.to_string();
            }
            None => entries.push(SavedQueryEntry::new(name, query, description)),
        }
    }

    /// All entries, in insertion order.
    pub async fn list(&self) -> Vec<SavedQueryEntry> {
        self.entries.read().await.clone()
    }

    /// Look up one entry by name.
    pub async fn get(&self, name: &str) -> Option<SavedQueryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }
}

/// Input for the save_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SaveQueryInput {
    /// Name to save the query under. Re-saving a name overwrites it.
    pub name: String,
    /// KQL query text
    pub query: String,
    /// Optional human description
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for the run_saved_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunSavedQueryInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Name of the saved query to run
    pub name: String,
    /// ISO-8601 time range. Default: PT1H
    #[serde(default)]
    pub timespan: Option<String>,
}

/// Handler for the saved-query tools.
pub struct SavedQueryToolHandler {
    store: Arc<SavedQueryStore>,
    engine: QueryEngine,
}

impl SavedQueryToolHandler {
    pub fn new(store: Arc<SavedQueryStore>, engine: QueryEngine) -> Self {
        Self { store, engine }
    }

    /// Save (or overwrite) a query. Always succeeds.
    pub async fn save_query(&self, input: SaveQueryInput) -> String {
        self.store
            .save(
                &input.name,
                &input.query,
                input.description.as_deref().unwrap_or(""),
            )
            .await;
        info!(name = %input.name, "Saved query");
        format!("Query '{}' saved successfully", input.name)
    }

    /// List all saved queries as pretty JSON, or a placeholder when empty.
    pub async fn list_saved_queries(&self) -> String {
        let entries = self.store.list().await;
        if entries.is_empty() {
            return "No saved queries".to_string();
        }
        serde_json::to_string_pretty(&entries).unwrap_or_default()
    }

    /// Run a saved query. Fails with NotFound before any remote call if the
    /// name is absent. Output format is fixed at json for this path.
    pub async fn run_saved_query(&self, input: RunSavedQueryInput) -> LogsResult<String> {
        let entry = self
            .store
            .get(&input.name)
            .await
            .ok_or_else(|| LogsError::saved_query_not_found(&input.name))?;

        self.engine
            .execute(
                input.workspace_id.as_deref(),
                &entry.query,
                input.timespan.as_deref().unwrap_or(DEFAULT_TIMESPAN),
                OutputFormat::Json,
                DEFAULT_ROW_LIMIT,
            )
            .await
    }
}
