//! Error types for the Azure Logs MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Errors are data: the MCP service boundary renders them as plain
//! text tool responses, so every message must stand on its own for an AI
//! assistant reading it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogsError {
    #[error(
        "No workspace specified. Provide a workspace_id argument or set AZURE_LOG_ANALYTICS_WORKSPACE_ID to configure a default."
    )]
    MissingWorkspace,

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Query failed: {message}")]
    QueryFailed {
        message: String,
        /// Service error code from the REST response (e.g. "BadArgumentError")
        code: Option<String>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LogsError {
    /// Create a not-found error for a saved query.
    pub fn saved_query_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Query",
            name: name.into(),
        }
    }

    /// Create a not-found error for a security query template.
    pub fn security_query_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Security query",
            name: name.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a remote query failure with an optional service error code.
    pub fn query_failed(message: impl Into<String>, code: Option<String>) -> Self {
        Self::QueryFailed {
            message: message.into(),
            code,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Service error code carried by this error, if any.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::QueryFailed { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for log analytics operations.
pub type LogsResult<T> = Result<T, LogsError>;
