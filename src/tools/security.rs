//! Built-in security query templates.
//!
//! A fixed, read-only catalog of KQL queries covering common security
//! analysis patterns. Templates are defined at compile time and never
//! mutated.

use crate::error::{LogsError, LogsResult};
use crate::models::{DEFAULT_ROW_LIMIT, DEFAULT_TIMESPAN};
use crate::tools::format::OutputFormat;
use crate::tools::query::QueryEngine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A built-in, read-only security query.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityQueryTemplate {
    pub name: &'static str,
    pub query: &'static str,
    pub description: &'static str,
}

/// The static security query catalog.
pub const SECURITY_QUERIES: &[SecurityQueryTemplate] = &[
    SecurityQueryTemplate {
        name: "failed_logins",
        query: "SigninLogs | where ResultType != 0 | summarize count() by UserPrincipalName, ResultType | order by count_ desc",
        description: "Failed login attempts by user",
    },
    SecurityQueryTemplate {
        name: "privileged_operations",
        query: "AuditLogs | where Category == 'RoleManagement' | project TimeGenerated, OperationName, InitiatedBy, TargetResources",
        description: "Privileged role management operations",
    },
    SecurityQueryTemplate {
        name: "suspicious_locations",
        query: "SigninLogs | where RiskLevelDuringSignIn == 'high' | project TimeGenerated, UserPrincipalName, Location, IPAddress",
        description: "High-risk sign-ins from suspicious locations",
    },
    SecurityQueryTemplate {
        name: "data_access_audit",
        query: "StorageBlobLogs | where OperationName == 'GetBlob' | summarize count() by AccountName, CallerIpAddress | order by count_ desc",
        description: "Data access patterns for blob storage",
    },
    SecurityQueryTemplate {
        name: "admin_activities",
        query: "AzureActivity | where CategoryValue == 'Administrative' and ActivityStatusValue == 'Success' | project TimeGenerated, Caller, OperationNameValue, ResourceGroup",
        description: "Administrative activities in Azure",
    },
    SecurityQueryTemplate {
        name: "network_security",
        query: "AzureNetworkAnalytics_CL | where FlowType_s == 'ExternalPublic' | summarize count() by SrcIP_s, DestPort_d | order by count_ desc",
        description: "External network connections",
    },
    SecurityQueryTemplate {
        name: "compliance_changes",
        query: "AzureActivity | where OperationNameValue contains 'policy' | project TimeGenerated, Caller, OperationNameValue, Properties",
        description: "Policy and compliance related changes",
    },
    SecurityQueryTemplate {
        name: "security_alerts",
        query: "SecurityAlert | summarize count() by AlertName, AlertSeverity, ProviderName | order by count_ desc",
        description: "Security alerts by name and severity",
    },
    SecurityQueryTemplate {
        name: "security_incidents",
        query: "SecurityIncident | project TimeGenerated, Title, Severity, Status, Owner | order by TimeGenerated desc",
        description: "Security incidents with status and ownership",
    },
    SecurityQueryTemplate {
        name: "malware_detections",
        query: "ProtectionStatus | where ThreatStatus !in ('No threats detected', 'Unknown') | project TimeGenerated, Computer, ThreatStatus, ThreatStatusRank",
        description: "Endpoints reporting malware detections",
    },
];

/// Look up one template by name.
pub fn get_security_query(name: &str) -> Option<&'static SecurityQueryTemplate> {
    SECURITY_QUERIES.iter().find(|t| t.name == name)
}

/// Input for the get_security_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetSecurityQueryInput {
    /// Template name from list_security_queries
    pub name: String,
}

/// Input for the run_security_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunSecurityQueryInput {
    /// Log Analytics workspace ID. Omit to use the server's configured default.
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Template name from list_security_queries
    pub name: String,
    /// ISO-8601 time range. Default: PT1H
    #[serde(default)]
    pub timespan: Option<String>,
    /// Output format: json (default), csv, or table
    #[serde(default)]
    pub format: OutputFormat,
}

/// Handler for the security query tools.
pub struct SecurityToolHandler {
    engine: QueryEngine,
}

impl SecurityToolHandler {
    pub fn new(engine: QueryEngine) -> Self {
        Self { engine }
    }

    /// List the catalog as {name, description} pairs.
    pub fn list_security_queries(&self) -> String {
        #[derive(Serialize)]
        struct Listing<'a> {
            name: &'a str,
            description: &'a str,
        }

        let listing: Vec<Listing> = SECURITY_QUERIES
            .iter()
            .map(|t| Listing {
                name: t.name,
                description: t.description,
            })
            .collect();
        serde_json::to_string_pretty(&listing).unwrap_or_default()
    }

    /// Return the full template, or a not-found message (not an error).
    pub fn get_security_query_text(&self, input: GetSecurityQueryInput) -> String {
        match get_security_query(&input.name) {
            Some(template) => serde_json::to_string_pretty(template).unwrap_or_default(),
            None => format!("Security query '{}' not found", input.name),
        }
    }

    /// Run a template. Fails with NotFound before any remote call if the
    /// name is absent.
    pub async fn run_security_query(&self, input: RunSecurityQueryInput) -> LogsResult<String> {
        let template = get_security_query(&input.name)
            .ok_or_else(|| LogsError::security_query_not_found(&input.name))?;

        self.engine
            .execute(
                input.workspace_id.as_deref(),
                template.query,
                input.timespan.as_deref().unwrap_or(DEFAULT_TIMESPAN),
                input.format,
                DEFAULT_ROW_LIMIT,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_ten_unique_templates() {
        assert_eq!(SECURITY_QUERIES.len(), 10);
        let names: HashSet<&str> = SECURITY_QUERIES.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_lookup_known_template() {
        let template = get_security_query("failed_logins").unwrap();
        assert!(template.query.starts_with("SigninLogs"));
        assert!(!template.description.is_empty());
    }

    #[test]
    fn test_lookup_unknown_template() {
        assert!(get_security_query("not_a_template").is_none());
    }

    #[test]
    fn test_all_templates_nonempty() {
        for template in SECURITY_QUERIES {
            assert!(!template.query.is_empty(), "{} has empty query", template.name);
            assert!(
                !template.description.is_empty(),
                "{} has empty description",
                template.name
            );
        }
    }
}
