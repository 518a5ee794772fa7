use serde::{Deserialize, Serialize};

/// Gateway service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Whether LAN access is allowed
    /// - false: localhost only 127.0.0.1 (default)
    /// - true: listen on 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where endpoint data comes from
    #[serde(default)]
    pub data_source: DataSourceMode,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// GoAPI upstream settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Outbound proxy for upstream calls
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,

    /// Authentication gate settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Data source selection. The two modes are alternative deployments, never layered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceMode {
    /// Forward every request to the GoAPI upstream
    Live,
    /// Answer with deterministic inline payloads
    #[default]
    Mock,
}

impl std::str::FromStr for DataSourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "mock" => Ok(Self::Mock),
            other => Err(format!("Unknown data source mode: {}", other)),
        }
    }
}

/// GoAPI upstream settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamConfig {
    /// Base URL, endpoint paths are appended to it (e.g. https://api.goapi.io/v1)
    #[serde(default)]
    pub base_url: String,
    /// Sent as the X-API-Key header
    #[serde(default)]
    pub api_key: String,
}

/// Upstream proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    /// Whether enabled
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

/// How protected routes authenticate callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Static bearer key shared with callers
    ApiKey,
    /// OAuth2 client-credentials grant via POST /oauth/token
    #[default]
    ClientCredentials,
}

/// Registered OAuth2 client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredential {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// Static key for `AuthMode::ApiKey`
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Clients allowed to request tokens in `AuthMode::ClientCredentials`
    #[serde(default)]
    pub clients: Vec<ClientCredential>,

    /// Access token lifetime (seconds)
    #[serde(default = "default_token_ttl")]
    pub token_ttl: i64,

    /// Token endpoint throttle per client id
    #[serde(default = "default_token_requests_per_minute")]
    pub token_requests_per_minute: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            api_key: default_api_key(),
            clients: Vec::new(),
            token_ttl: default_token_ttl(),
            token_requests_per_minute: default_token_requests_per_minute(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            port: default_port(),
            data_source: DataSourceMode::default(),
            request_timeout: default_request_timeout(),
            upstream: UpstreamConfig::default(),
            upstream_proxy: UpstreamProxyConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    8045
}

fn default_request_timeout() -> u64 {
    30
}

fn default_api_key() -> String {
    format!("sk-{}", uuid::Uuid::new_v4().simple())
}

fn default_token_ttl() -> i64 {
    3600
}

fn default_token_requests_per_minute() -> u32 {
    60
}

impl GatewayConfig {
    /// Get the actual listen address
    /// - allow_lan_access = false: "127.0.0.1"
    /// - allow_lan_access = true: "0.0.0.0"
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{ "data_source": "live", "auth": { "mode": "api_key", "api_key": "k" } }"#,
        )
        .unwrap();

        assert_eq!(config.port, 8045);
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.data_source, DataSourceMode::Live);
        assert_eq!(config.auth.mode, AuthMode::ApiKey);
        assert_eq!(config.auth.api_key, "k");
        assert_eq!(config.auth.token_requests_per_minute, 60);
        assert_eq!(config.get_bind_address(), "127.0.0.1");
    }

    #[test]
    fn test_data_source_mode_from_str() {
        assert_eq!("LIVE".parse::<DataSourceMode>(), Ok(DataSourceMode::Live));
        assert_eq!(" mock ".parse::<DataSourceMode>(), Ok(DataSourceMode::Mock));
        assert!("cache".parse::<DataSourceMode>().is_err());
    }
}
