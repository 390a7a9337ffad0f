//! Azure Logs MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to run KQL queries against Azure Log Analytics workspaces.

use azure_logs_mcp_server::config::{Config, TransportMode};
use azure_logs_mcp_server::mcp::ServiceState;
use azure_logs_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting Azure Logs MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let settings = config.azure_settings();

    // Credentials and workspace are optional at startup: tool calls report
    // what is missing instead of refusing to serve
    if settings.has_explicit_credential() {
        info!("Using service principal credentials from configuration");
    } else {
        info!("No explicit credentials configured, will use ambient Azure credentials");
    }

    match &settings.default_workspace_id {
        Some(id) => info!(workspace_id = %id, "Default workspace configured"),
        None => warn!(
            "No default workspace configured; tool calls must supply workspace_id explicitly"
        ),
    }

    let state = Arc::new(ServiceState::new(settings));

    // Run the appropriate transport
    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(state);
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(
                state,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
