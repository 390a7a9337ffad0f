//! Data models for queries and saved queries.

pub mod query;
pub mod saved;

pub use query::{
    DEFAULT_ROW_LIMIT, DEFAULT_TIMESPAN, LogsColumn, LogsQueryResponse, LogsTable, RowRecord,
};
pub use saved::SavedQueryEntry;
