//! MCP service implementation using rmcp.
//!
//! This module defines the LogsService struct with all Log Analytics tools
//! exposed via the MCP protocol using the rmcp framework's macros. Tool
//! failures are data, not protocol faults: every handler error is rendered
//! as a successful text response carrying the error message, so callers must
//! inspect the payload to detect failure.

use crate::auth::{TokenProvider, select_credential};
use crate::client::{LogAnalyticsClient, LogsClient};
use crate::config::AzureSettings;
use crate::error::{LogsError, LogsResult};
use crate::tools::batch::{BatchQueryInput, BatchToolHandler};
use crate::tools::connectivity::{ConnectivityToolHandler, TestConnectivityInput};
use crate::tools::export::{ExportResultsInput, ExportToolHandler};
use crate::tools::query::{QueryEngine, QueryLogsInput, QueryToolHandler};
use crate::tools::saved::{
    RunSavedQueryInput, SaveQueryInput, SavedQueryStore, SavedQueryToolHandler,
};
use crate::tools::schema::{GetTableSchemaInput, ListTablesInput, SchemaToolHandler};
use crate::tools::security::{GetSecurityQueryInput, RunSecurityQueryInput, SecurityToolHandler};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// State shared by every session: Azure settings, the lazily-created query
/// client, and the saved-query store.
pub struct ServiceState {
    settings: AzureSettings,
    /// Single-flight lazy client: created on the first tool call that needs
    /// it, reused by every call after that.
    client: OnceCell<Arc<dyn LogsClient>>,
    saved_queries: Arc<SavedQueryStore>,
}

impl ServiceState {
    pub fn new(settings: AzureSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
            saved_queries: Arc::new(SavedQueryStore::new()),
        }
    }

    /// Create state with a preset client (bypasses lazy init; for tests).
    pub fn with_client(settings: AzureSettings, client: Arc<dyn LogsClient>) -> Self {
        Self {
            settings,
            client: OnceCell::new_with(Some(client)),
            saved_queries: Arc::new(SavedQueryStore::new()),
        }
    }

    pub fn settings(&self) -> &AzureSettings {
        &self.settings
    }

    /// Get the shared query client, initializing it on first use.
    pub async fn client(&self) -> LogsResult<Arc<dyn LogsClient>> {
        let client = self
            .client
            .get_or_try_init(|| async {
                let credential = select_credential(&self.settings);
                info!(credential = credential.name(), "Initializing Log Analytics client");
                let tokens = TokenProvider::new(credential, reqwest::Client::new());
                Ok::<_, LogsError>(Arc::new(LogAnalyticsClient::new(
                    tokens,
                    self.settings.api_endpoint.clone(),
                )) as Arc<dyn LogsClient>)
            })
            .await?;
        Ok(client.clone())
    }
}

/// Render a handler result as a text tool response. Failures become text
/// payloads; the protocol layer never sees them as faults.
fn text_response(result: LogsResult<String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::success(vec![Content::text(e.to_string())]),
    }
}

#[derive(Clone)]
pub struct LogsService {
    state: Arc<ServiceState>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl LogsService {
    pub fn new(state: Arc<ServiceState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Build a query engine over the shared client. The client is created
    /// lazily here, exactly once per process.
    async fn engine(&self) -> LogsResult<QueryEngine> {
        let client = self
            .state
            .client()
            .await
            .map_err(|e| LogsError::internal(format!("Failed to initialize Azure client: {}", e)))?;
        Ok(QueryEngine::new(
            client,
            self.state.settings().default_workspace_id.clone(),
        ))
    }
}

#[tool_router]
impl LogsService {
    #[tool(
        description = "Execute a KQL query against an Azure Log Analytics workspace.\nThe query is forwarded verbatim. Output format: json (default), csv, or table.\nReturns 'No results found' when the query matches nothing."
    )]
    async fn query_logs(
        &self,
        Parameters(input): Parameters<QueryLogsInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => QueryToolHandler::new(engine).query_logs(input).await,
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(
        description = "Execute multiple KQL queries sequentially against one workspace.\nEach item has an id, a query, and an optional timespan (default PT1H).\nReturns a JSON mapping of id to formatted result; a failed item's slot holds 'Error: ...' and does not abort the rest."
    )]
    async fn query_logs_batch(
        &self,
        Parameters(input): Parameters<BatchQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => BatchToolHandler::new(engine).query_logs_batch(input).await,
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(
        description = "Save a KQL query for reuse. Re-saving an existing name overwrites it.\nSaved queries live for the server process lifetime only."
    )]
    async fn save_query(
        &self,
        Parameters(input): Parameters<SaveQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => {
                let handler = SavedQueryToolHandler::new(self.state.saved_queries.clone(), engine);
                Ok(handler.save_query(input).await)
            }
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(description = "List all saved queries with their names, descriptions, and query text.")]
    async fn list_saved_queries(&self) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => {
                let handler = SavedQueryToolHandler::new(self.state.saved_queries.clone(), engine);
                Ok(handler.list_saved_queries().await)
            }
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(
        description = "Execute a previously saved query by name.\nFails with a not-found message if the name was never saved. Output is json."
    )]
    async fn run_saved_query(
        &self,
        Parameters(input): Parameters<RunSavedQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => {
                SavedQueryToolHandler::new(self.state.saved_queries.clone(), engine)
                    .run_saved_query(input)
                    .await
            }
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(
        description = "List the built-in security query templates (failed sign-ins, privileged operations, alerts, incidents, malware detections, and more)."
    )]
    async fn list_security_queries(&self) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => Ok(SecurityToolHandler::new(engine).list_security_queries()),
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(description = "Get the full KQL text and description of a built-in security query template.")]
    async fn get_security_query(
        &self,
        Parameters(input): Parameters<GetSecurityQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => Ok(SecurityToolHandler::new(engine).get_security_query_text(input)),
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(
        description = "Execute a built-in security query template against a workspace.\nSupports an optional timespan (default PT1H) and output format."
    )]
    async fn run_security_query(
        &self,
        Parameters(input): Parameters<RunSecurityQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => SecurityToolHandler::new(engine).run_security_query(input).await,
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(
        description = "Check connectivity to a Log Analytics workspace with a minimal probe query.\nNever fails: returns a structured record with status 'ok' or 'error', or a configuration hint when no workspace is resolvable."
    )]
    async fn test_connectivity(
        &self,
        Parameters(input): Parameters<TestConnectivityInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => Ok(ConnectivityToolHandler::new(engine).test_connectivity(input).await),
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(description = "List tables that held data in the workspace over the last 30 days.")]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => SchemaToolHandler::new(engine).list_tables(input).await,
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(description = "Get the column schema (name, data type) for one workspace table.")]
    async fn get_table_schema(
        &self,
        Parameters(input): Parameters<GetTableSchemaInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => SchemaToolHandler::new(engine).get_table_schema(input).await,
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }

    #[tool(
        description = "Run a KQL query over the last 24 hours and write all results to a local file.\nFormat: csv (default) or json."
    )]
    async fn export_results(
        &self,
        Parameters(input): Parameters<ExportResultsInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = match self.engine().await {
            Ok(engine) => ExportToolHandler::new(engine).export_results(input).await,
            Err(e) => Err(e),
        };
        Ok(text_response(result))
    }
}

#[tool_handler]
impl ServerHandler for LogsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "azure-logs-mcp-server".to_owned(),
                title: Some("Azure Logs MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for querying Azure Log Analytics workspaces with KQL.\n\
                \n\
                ## Workflow\n\
                1. Pass workspace_id explicitly, or rely on the server's configured default\n\
                2. Use `query_logs` for one query, `query_logs_batch` for several\n\
                3. `save_query` / `run_saved_query` keep reusable queries for this session\n\
                4. `list_security_queries` exposes built-in security analysis templates\n\
                \n\
                ## Notes\n\
                - Queries are forwarded to the service verbatim; write plain KQL\n\
                - Timespans are ISO-8601 durations (PT1H, P1D, P7D); default is PT1H\n\
                - Tool failures come back as text payloads (e.g. 'Query failed: ...'),\n\
                  so inspect the response text rather than expecting a protocol error\n\
                - `test_connectivity` verifies credentials and workspace reachability"
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogsQueryResponse;
    use async_trait::async_trait;

    struct NeverCalledClient;

    #[async_trait]
    impl LogsClient for NeverCalledClient {
        async fn query(&self, _: &str, _: &str, _: &str) -> LogsResult<LogsQueryResponse> {
            panic!("client must not be called");
        }
    }

    fn create_test_service() -> LogsService {
        let state = ServiceState::with_client(
            AzureSettings::default(),
            Arc::new(NeverCalledClient),
        );
        LogsService::new(Arc::new(state))
    }

    #[test]
    fn test_service_creation() {
        let _service = create_test_service();
    }

    #[test]
    fn test_router_routes_exactly_the_exposed_tools() {
        let router = LogsService::tool_router();
        let expected = [
            "query_logs",
            "query_logs_batch",
            "save_query",
            "list_saved_queries",
            "run_saved_query",
            "list_security_queries",
            "get_security_query",
            "run_security_query",
            "test_connectivity",
            "list_tables",
            "get_table_schema",
            "export_results",
        ];

        assert_eq!(router.list_all().len(), expected.len());
        for name in expected {
            assert!(router.has_route(name), "missing route for {}", name);
        }

        // Names outside the registry have no route: the router rejects them
        // before any handler (and thus the query client) can run
        assert!(!router.has_route("drop_table"));
        assert!(!router.has_route("query"));
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert!(!info.server_info.name.is_empty());
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_preset_client_skips_lazy_init() {
        let service = create_test_service();
        // No credentials configured, but the preset client is returned as-is
        assert!(service.state.client().await.is_ok());
    }

    #[test]
    fn test_text_response_renders_errors_as_payload() {
        let response = text_response(Err(LogsError::MissingWorkspace));
        assert_ne!(response.is_error, Some(true));
    }
}
