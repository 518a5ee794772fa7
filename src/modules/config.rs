use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const DATA_DIR: &str = ".goapi_gateway";
const CONFIG_FILE: &str = "gateway_config.json";

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

/// Get data directory path, creating it when missing
pub fn get_data_dir() -> AppResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AppError::Config("Failed to get user home directory".to_string()))?;
    let data_dir = home.join(DATA_DIR);

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

/// Resolve the config file location (GATEWAY_CONFIG wins over the data directory)
pub fn get_config_path() -> AppResult<PathBuf> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(get_data_dir()?.join(CONFIG_FILE)),
    }
}

/// Where the loaded configuration came from
///
/// Config is read before the logger exists, so the caller reports this once
/// logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "loaded from {:?}", path),
            ConfigSource::Defaults(path) => write!(f, "{:?} not found, using defaults", path),
        }
    }
}

/// Load application config, then apply environment overrides
pub fn load_app_config() -> AppResult<(AppConfig, ConfigSource)> {
    let config_path = get_config_path()?;
    let (mut config, source) = load_config_file(&config_path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok((config, source))
}

/// Read a config file; a missing file yields defaults
pub fn load_config_file(config_path: &PathBuf) -> AppResult<(AppConfig, ConfigSource)> {
    if !config_path.exists() {
        return Ok((AppConfig::new(), ConfigSource::Defaults(config_path.clone())));
    }

    let content = fs::read_to_string(config_path)?;
    let config = serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

    Ok((config, ConfigSource::File(config_path.clone())))
}

/// Overlay deployment values from the environment
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let gateway = &mut config.gateway;

    if let Some(key) = lookup("GOAPI_API_KEY") {
        gateway.upstream.api_key = key;
    }
    if let Some(base_url) = lookup("GOAPI_BASE_URL") {
        gateway.upstream.base_url = base_url;
    }
    if let Some(port) = lookup("GATEWAY_PORT") {
        gateway.port = port
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid GATEWAY_PORT {}: {}", port, e)))?;
    }
    if let Some(mode) = lookup("GATEWAY_DATA_SOURCE") {
        gateway.data_source = mode.parse().map_err(AppError::Config)?;
    }

    Ok(())
}
