//! MCP tool implementations.
//!
//! This module contains all tool handlers:
//! - `query`: execute one KQL query (and the shared QueryEngine)
//! - `batch`: execute multiple queries with per-item failure isolation
//! - `saved`: save/list/run reusable queries (process lifetime)
//! - `security`: built-in security query templates
//! - `connectivity`: workspace connectivity diagnostic
//! - `schema`: list_tables / get_table_schema discovery probes
//! - `export`: write query results to a file
//! - `format`: row normalization and json/csv/table rendering

pub mod batch;
pub mod connectivity;
pub mod export;
pub mod format;
pub mod query;
pub mod saved;
pub mod schema;
pub mod security;

pub use batch::{BatchQueryInput, BatchQueryItem, BatchToolHandler};
pub use connectivity::{ConnectivityToolHandler, TestConnectivityInput};
pub use export::{ExportResultsInput, ExportToolHandler};
pub use format::{OutputFormat, flatten_tables, format_records};
pub use query::{QueryEngine, QueryLogsInput, QueryToolHandler};
pub use saved::{RunSavedQueryInput, SaveQueryInput, SavedQueryStore, SavedQueryToolHandler};
pub use schema::{GetTableSchemaInput, ListTablesInput, SchemaToolHandler};
pub use security::{
    GetSecurityQueryInput, RunSecurityQueryInput, SECURITY_QUERIES, SecurityToolHandler,
};
