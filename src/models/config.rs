use crate::proxy::GatewayConfig;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            log_level: default_log_level(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
