use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::AzureError;
use crate::config::AzureConfig;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 300;
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
const IMDS_API_VERSION: &str = "2018-02-01";

#[derive(Debug, Clone)]
enum CredentialSource {
    ServicePrincipal {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    ManagedIdentity {
        client_id: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(i64),
    Text(String),
}

impl Seconds {
    fn as_secs(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<Seconds>,
}

/// Default credential chain: a service principal when one is fully
/// configured, otherwise the managed identity of the host.
#[derive(Debug)]
pub struct AzureCredential {
    source: CredentialSource,
    login_url: String,
    imds_url: String,
    resource: String,
    cache: RwLock<Option<CachedToken>>,
}

impl AzureCredential {
    pub fn from_config(config: &AzureConfig) -> Self {
        let source = if config.has_service_principal() {
            CredentialSource::ServicePrincipal {
                tenant_id: config.tenant_id.clone().unwrap_or_default(),
                client_id: config.client_id.clone().unwrap_or_default(),
                client_secret: config.client_secret.clone().unwrap_or_default(),
            }
        } else {
            CredentialSource::ManagedIdentity {
                client_id: config.client_id.clone().filter(|c| !c.trim().is_empty()),
            }
        };

        Self {
            source,
            login_url: config.login_url.trim_end_matches('/').to_string(),
            imds_url: config.imds_url.clone(),
            resource: config.management_url.trim_end_matches('/').to_string(),
            cache: RwLock::new(None),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.source {
            CredentialSource::ServicePrincipal { .. } => "ServicePrincipal",
            CredentialSource::ManagedIdentity { .. } => "ManagedIdentity",
        }
    }

    /// Bearer token for the management API, served from cache while fresh.
    pub async fn token(&self, http: &reqwest::Client) -> Result<String, AzureError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self.request_token(http).await?;
        let lifetime = response
            .expires_in
            .as_ref()
            .and_then(Seconds::as_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        let token = CachedToken {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        };
        tracing::debug!(credential = self.kind(), expires_at = %token.expires_at, "Acquired management token");

        let access_token = token.access_token.clone();
        *self.cache.write().await = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self, http: &reqwest::Client) -> Result<TokenResponse, AzureError> {
        let request = match &self.source {
            CredentialSource::ServicePrincipal {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let scope = format!("{}/.default", self.resource);
                http.post(format!("{}/{tenant_id}/oauth2/v2.0/token", self.login_url))
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("scope", scope.as_str()),
                    ])
            }
            CredentialSource::ManagedIdentity { client_id } => {
                let resource = format!("{}/", self.resource);
                let mut query = vec![("api-version", IMDS_API_VERSION), ("resource", resource.as_str())];
                if let Some(id) = client_id {
                    query.push(("client_id", id.as_str()));
                }
                http.get(&self.imds_url).header("Metadata", "true").query(&query)
            }
        };

        let resp = request
            .send()
            .await
            .map_err(|e| AzureError::Credential(format!("{} token request failed: {e}", self.kind())))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AzureError::Credential(format!(
                "{} token request returned {status}: {body}",
                self.kind()
            )));
        }

        resp.json::<TokenResponse>()
            .await
            .map_err(|e| AzureError::Credential(format!("invalid token response: {e}")))
    }
}
