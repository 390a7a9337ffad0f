//! Saved query data model.

use serde::{Deserialize, Serialize};

/// A user-saved KQL query. Process lifetime only; lost on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQueryEntry {
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub description: String,
}

impl SavedQueryEntry {
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            description: description.into(),
        }
    }
}
