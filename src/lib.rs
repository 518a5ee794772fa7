pub mod error;
pub mod models;
pub mod modules;
pub mod proxy; // Gateway service module
mod utils;

use error::AppResult;
use modules::logger;
use proxy::{AppState, AxumServer};
use tracing::{error, info};

/// Load configuration, start the gateway and serve until Ctrl+C
pub async fn run() -> AppResult<()> {
    let (config, config_source) = modules::config::load_app_config()?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = logger::init_logger(&config.log_level);
    info!("Configuration {}", config_source);

    let gateway = &config.gateway;
    info!(
        "Starting gateway (data source: {:?}, auth: {:?})",
        gateway.data_source, gateway.auth.mode
    );

    let state = AppState::from_config(gateway)?;
    let (server, handle) =
        AxumServer::start(gateway.get_bind_address(), gateway.port, state).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    server.stop();
    if let Err(e) = handle.await {
        error!("Gateway server task failed: {}", e);
    }

    Ok(())
}
