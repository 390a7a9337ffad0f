//! Configuration handling for the Azure Logs MCP Server.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables. Azure credentials and the default workspace are
//! read once at startup and never re-evaluated per call.

use clap::{Parser, ValueEnum};

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";

/// Default public-cloud Log Analytics API endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.loganalytics.io";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Azure settings consumed by the credential selector and query client.
#[derive(Debug, Clone, Default)]
pub struct AzureSettings {
    /// Azure AD tenant ID (explicit credential)
    pub tenant_id: Option<String>,
    /// Service principal client ID (explicit credential)
    pub client_id: Option<String>,
    /// Service principal client secret (sensitive - never logged)
    pub client_secret: Option<String>,
    /// Process-wide default Log Analytics workspace ID
    pub default_workspace_id: Option<String>,
    /// Log Analytics API base URL
    pub api_endpoint: String,
}

impl AzureSettings {
    /// True if the full explicit-credential trio is configured.
    pub fn has_explicit_credential(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// Configuration for the Azure Logs MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "azure-logs-mcp-server",
    about = "MCP server for Azure Log Analytics - enables AI assistants to run KQL queries against log workspaces",
    version,
    author
)]
pub struct Config {
    /// Default Log Analytics workspace ID used when a tool call omits workspace_id
    #[arg(
        short = 'w',
        long = "workspace-id",
        value_name = "GUID",
        env = "AZURE_LOG_ANALYTICS_WORKSPACE_ID"
    )]
    pub workspace_id: Option<String>,

    /// Azure AD tenant ID for service principal authentication
    #[arg(long, value_name = "GUID", env = "AZURE_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Service principal client ID
    #[arg(long, value_name = "GUID", env = "AZURE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Service principal client secret
    #[arg(long, env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Log Analytics API endpoint (override for sovereign clouds)
    #[arg(
        long,
        default_value = DEFAULT_API_ENDPOINT,
        env = "AZURE_LOGS_API_ENDPOINT"
    )]
    pub api_endpoint: String,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            workspace_id: None,
            tenant_id: None,
            client_id: None,
            client_secret: None,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Extract the Azure settings consumed by the client layer.
    pub fn azure_settings(&self) -> AzureSettings {
        AzureSettings {
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            default_workspace_id: self.workspace_id.clone(),
            api_endpoint: self.api_endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
