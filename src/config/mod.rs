use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "CRM_BRIDGE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "crm-bridge.toml";

/// Upper bound for cache TTLs and the sweep interval (30 days).
pub const MAX_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Complete bridge configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hubspot: HubSpotConfig,
    #[serde(default)]
    pub oauth: OAuthTtlConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Origin of the frontend that opens the OAuth popup
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// HubSpot app registration and endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct HubSpotConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// CRM API base (object listing)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Web app base used to build record links
    #[serde(default = "default_app_url")]
    pub app_url: String,
    #[serde(default = "default_portal_id")]
    pub portal_id: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/integrations/hubspot/oauth2callback".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "crm.objects.contacts.read".to_string(),
        "crm.objects.companies.read".to_string(),
        "crm.objects.deals.read".to_string(),
    ]
}

fn default_auth_url() -> String {
    "https://app.hubspot.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://api.hubapi.com/oauth/v1/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_app_url() -> String {
    "https://app.hubspot.com".to_string()
}

fn default_portal_id() -> String {
    "your_hub_id".to_string()
}

fn default_page_size() -> u32 {
    100
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            app_url: default_app_url(),
            portal_id: default_portal_id(),
            page_size: default_page_size(),
        }
    }
}

/// Lifetimes of the transient cache entries written by the OAuth flow
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTtlConfig {
    #[serde(default = "default_ttl_seconds")]
    pub state_ttl_seconds: u64,
    #[serde(default = "default_ttl_seconds")]
    pub credentials_ttl_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    600
}

impl Default for OAuthTtlConfig {
    fn default() -> Self {
        Self {
            state_ttl_seconds: default_ttl_seconds(),
            credentials_ttl_seconds: default_ttl_seconds(),
        }
    }
}

/// Cache backend selection
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Use Redis when set, otherwise the in-process cache
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Sweep interval for the in-process cache
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_cleanup_interval() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl BridgeConfig {
    /// Override file values with `CRM_BRIDGE_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CRM_BRIDGE_HUBSPOT_CLIENT_ID") {
            self.hubspot.client_id = v;
        }
        if let Some(v) = lookup("CRM_BRIDGE_HUBSPOT_CLIENT_SECRET") {
            self.hubspot.client_secret = v;
        }
        if let Some(v) = lookup("CRM_BRIDGE_HUBSPOT_REDIRECT_URI") {
            self.hubspot.redirect_uri = v;
        }
        if let Some(v) = lookup("CRM_BRIDGE_REDIS_URL") {
            self.cache.redis_url = Some(v);
        }
        if let Some(v) = lookup("CRM_BRIDGE_BIND_ADDR") {
            self.server.bind_addr = v;
        }
    }

    /// Reject configurations the OAuth flow cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.hubspot.client_id.is_empty() {
            bail!("HubSpot client id is not set (CRM_BRIDGE_HUBSPOT_CLIENT_ID)");
        }
        if self.hubspot.client_secret.is_empty() {
            bail!("HubSpot client secret is not set (CRM_BRIDGE_HUBSPOT_CLIENT_SECRET)");
        }
        if self.hubspot.page_size == 0 {
            bail!("hubspot.page_size must be greater than zero");
        }
        check_seconds("oauth.state_ttl_seconds", self.oauth.state_ttl_seconds)?;
        check_seconds("oauth.credentials_ttl_seconds", self.oauth.credentials_ttl_seconds)?;
        check_seconds("cache.cleanup_interval_seconds", self.cache.cleanup_interval_seconds)?;
        Ok(())
    }
}

fn check_seconds(name: &str, value: u64) -> Result<()> {
    if value == 0 || value > MAX_TTL_SECONDS {
        bail!("{} must be between 1 and {} seconds, got {}", name, MAX_TTL_SECONDS, value);
    }
    Ok(())
}

/// Load configuration from TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BridgeConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: BridgeConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load the process configuration: optional TOML file, then environment
/// overrides, then validation.
pub fn load() -> Result<BridgeConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        tracing::info!(path = %path, "Config file not found, using defaults");
        BridgeConfig::default()
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.hubspot.token_url, "https://api.hubapi.com/oauth/v1/token");
        assert_eq!(config.hubspot.scopes.len(), 3);
        assert_eq!(config.hubspot.page_size, 100);
        assert_eq!(config.oauth.state_ttl_seconds, 600);
        assert_eq!(config.oauth.credentials_ttl_seconds, 600);
        assert!(config.cache.redis_url.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            bind_addr = "127.0.0.1:9000"

            [hubspot]
            client_id = "abc"
            client_secret = "shh"
            scopes = ["crm.objects.contacts.read"]
            portal_id = "4242"

            [oauth]
            state_ttl_seconds = 120

            [cache]
            redis_url = "redis://localhost:6379"
        "#;

        let config: BridgeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.hubspot.client_id, "abc");
        assert_eq!(config.hubspot.scopes, vec!["crm.objects.contacts.read"]);
        assert_eq!(config.hubspot.portal_id, "4242");
        assert_eq!(config.oauth.state_ttl_seconds, 120);
        assert_eq!(config.oauth.credentials_ttl_seconds, 600); // Default
        assert_eq!(config.cache.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CRM_BRIDGE_HUBSPOT_CLIENT_ID", "env_id"),
            ("CRM_BRIDGE_HUBSPOT_CLIENT_SECRET", "env_secret"),
            ("CRM_BRIDGE_BIND_ADDR", "127.0.0.1:1234"),
        ]
        .into_iter()
        .collect();

        let mut config = BridgeConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.hubspot.client_id, "env_id");
        assert_eq!(config.hubspot.client_secret, "env_secret");
        assert_eq!(config.server.bind_addr, "127.0.0.1:1234");
        assert!(config.cache.redis_url.is_none());
    }

    #[test]
    fn test_validate_requires_client_credentials() {
        let config = BridgeConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("client id"));

        let mut config = BridgeConfig::default();
        config.hubspot.client_id = "id".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("client secret"));
    }

    #[test]
    fn test_validate_bounds_durations() {
        let mut config = BridgeConfig::default();
        config.hubspot.client_id = "id".to_string();
        config.hubspot.client_secret = "secret".to_string();
        assert!(config.validate().is_ok());

        config.oauth.state_ttl_seconds = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("oauth.state_ttl_seconds"));

        config.oauth.state_ttl_seconds = 600;
        config.oauth.credentials_ttl_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("oauth.credentials_ttl_seconds"));

        config.oauth.credentials_ttl_seconds = MAX_TTL_SECONDS;
        config.cache.cleanup_interval_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache.cleanup_interval_seconds"));
    }
}
