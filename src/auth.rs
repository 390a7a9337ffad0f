//! Credential selection and token acquisition for Azure AD.
//!
//! The credential strategy is chosen exactly once, at client initialization:
//! if a tenant ID, client ID, and client secret are all configured, the
//! explicit service-principal flow is used; otherwise the ambient chain
//! applies (environment variables at token time, then the IMDS managed
//! identity endpoint). Tokens are cached until shortly before expiry.

use crate::config::AzureSettings;
use crate::error::{LogsError, LogsResult};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// OAuth2 scope for the Log Analytics data plane.
const TOKEN_SCOPE: &str = "https://api.loganalytics.io/.default";

/// Resource URI used by the IMDS managed identity flow.
const IMDS_RESOURCE: &str = "https://api.loganalytics.io/";

/// Azure instance metadata service token endpoint.
const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// Refresh tokens this long before their reported expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Authentication strategy selected from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialKind {
    /// Service principal with an explicit client secret.
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// Environment-discovered credential: AZURE_* variables, then IMDS.
    Ambient,
}

impl CredentialKind {
    /// Short name for logging. Never includes secret material.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClientSecret { .. } => "client-secret",
            Self::Ambient => "ambient",
        }
    }
}

/// Choose a credential strategy from the configured settings.
///
/// Pure function of configuration: the explicit strategy is selected only
/// when the full trio is present.
pub fn select_credential(settings: &AzureSettings) -> CredentialKind {
    match (
        settings.tenant_id.as_ref(),
        settings.client_id.as_ref(),
        settings.client_secret.as_ref(),
    ) {
        (Some(tenant_id), Some(client_id), Some(client_secret)) => CredentialKind::ClientSecret {
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        },
        _ => CredentialKind::Ambient,
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS)
    }
}

/// Token endpoint response (both AAD and IMDS shapes).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// AAD returns a number; IMDS returns a string.
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    fn expires_in_secs(&self) -> i64 {
        match &self.expires_in {
            Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(300),
            Some(serde_json::Value::String(s)) => s.parse().unwrap_or(300),
            _ => 300,
        }
    }
}

/// Acquires and caches Azure AD access tokens for the selected credential.
pub struct TokenProvider {
    credential: CredentialKind,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(credential: CredentialKind, http: reqwest::Client) -> Self {
        Self {
            credential,
            http,
            cached: RwLock::new(None),
        }
    }

    /// Get a valid access token, refreshing if the cached one is stale.
    pub async fn access_token(&self) -> LogsResult<String> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    async fn request_token(&self) -> LogsResult<CachedToken> {
        match &self.credential {
            CredentialKind::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                debug!(credential = "client-secret", "Requesting access token");
                self.client_secret_token(tenant_id, client_id, client_secret)
                    .await
            }
            CredentialKind::Ambient => {
                // Environment trio first, matching the default credential chain
                let tenant = std::env::var("AZURE_TENANT_ID").ok();
                let client = std::env::var("AZURE_CLIENT_ID").ok();
                let secret = std::env::var("AZURE_CLIENT_SECRET").ok();
                if let (Some(tenant), Some(client), Some(secret)) = (tenant, client, secret) {
                    debug!(credential = "ambient-env", "Requesting access token");
                    self.client_secret_token(&tenant, &client, &secret).await
                } else {
                    debug!(credential = "ambient-imds", "Requesting access token");
                    self.imds_token().await
                }
            }
        }
    }

    async fn client_secret_token(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> LogsResult<CachedToken> {
        let url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            tenant_id
        );
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", TOKEN_SCOPE),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| LogsError::auth(format!("token request failed: {}", e)))?;

        Self::parse_token_response(response).await
    }

    async fn imds_token(&self) -> LogsResult<CachedToken> {
        let response = self
            .http
            .get(IMDS_TOKEN_URL)
            .header("Metadata", "true")
            .query(&[("api-version", "2018-02-01"), ("resource", IMDS_RESOURCE)])
            .send()
            .await
            .map_err(|e| {
                LogsError::auth(format!(
                    "no credential available: environment variables are unset and the managed identity endpoint is unreachable ({})",
                    e
                ))
            })?;

        Self::parse_token_response(response).await
    }

    async fn parse_token_response(response: reqwest::Response) -> LogsResult<CachedToken> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LogsError::auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| LogsError::auth(format!("malformed token response: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in_secs());
        Ok(CachedToken {
            token: token.access_token,
            expires_at,
        })
    }
}
