use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    7071
}

/// Azure subscription and credential settings.
///
/// When `tenant_id`, `client_id` and `client_secret` are all set the
/// service-principal credential is used, otherwise managed identity.
#[derive(Debug, Deserialize, Clone)]
pub struct AzureConfig {
    pub subscription_id: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default = "default_management_url")]
    pub management_url: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_imds_url")]
    pub imds_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription_id: None,
            tenant_id: None,
            client_id: None,
            client_secret: None,
            management_url: default_management_url(),
            login_url: default_login_url(),
            imds_url: default_imds_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AzureConfig {
    /// Subscription id, ignoring blank values.
    pub fn subscription(&self) -> Option<&str> {
        self.subscription_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Fills unset fields from the conventional `AZURE_*` variables.
    pub fn fill_from_standard_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let slots = [
            (&mut self.subscription_id, "AZURE_SUBSCRIPTION_ID"),
            (&mut self.tenant_id, "AZURE_TENANT_ID"),
            (&mut self.client_id, "AZURE_CLIENT_ID"),
            (&mut self.client_secret, "AZURE_CLIENT_SECRET"),
        ];
        for (slot, key) in slots {
            if slot.is_none() {
                *slot = lookup(key);
            }
        }
    }

    pub fn has_service_principal(&self) -> bool {
        [&self.tenant_id, &self.client_id, &self.client_secret]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

fn default_management_url() -> String {
    "https://management.azure.com".into()
}

fn default_login_url() -> String {
    "https://login.microsoftonline.com".into()
}

fn default_imds_url() -> String {
    "http://169.254.169.254/metadata/identity/oauth2/token".into()
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_time_period")]
    pub default_time_period_days: i64,
    #[serde(default = "default_max_time_period")]
    pub max_time_period_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_time_period_days: default_time_period(),
            max_time_period_days: default_max_time_period(),
        }
    }
}

fn default_time_period() -> i64 {
    30
}

fn default_max_time_period() -> i64 {
    365
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SAVEGURU").separator("__"))
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.azure.fill_from_standard_env(|key| std::env::var(key).ok());
        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_subscription_is_missing() {
        let mut azure = AzureConfig::default();
        assert_eq!(azure.subscription(), None);

        azure.subscription_id = Some("   ".into());
        assert_eq!(azure.subscription(), None);

        azure.subscription_id = Some(" 0000-1111 ".into());
        assert_eq!(azure.subscription(), Some("0000-1111"));
    }

    #[test]
    fn test_service_principal_requires_all_parts() {
        let mut azure = AzureConfig {
            tenant_id: Some("tenant".into()),
            client_id: Some("client".into()),
            ..Default::default()
        };
        assert!(!azure.has_service_principal());

        azure.client_secret = Some("secret".into());
        assert!(azure.has_service_principal());
    }

    #[test]
    fn test_standard_env_only_fills_unset_fields() {
        let mut azure = AzureConfig {
            subscription_id: Some("from-config".into()),
            ..Default::default()
        };
        azure.fill_from_standard_env(|key| match key {
            "AZURE_SUBSCRIPTION_ID" => Some("from-env".into()),
            "AZURE_TENANT_ID" => Some("tenant".into()),
            _ => None,
        });

        assert_eq!(azure.subscription(), Some("from-config"));
        assert_eq!(azure.tenant_id.as_deref(), Some("tenant"));
        assert!(azure.client_id.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 7071);
        assert_eq!(config.analysis.default_time_period_days, 30);
        assert_eq!(config.azure.management_url, "https://management.azure.com");
    }
}
