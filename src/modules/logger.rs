use crate::error::AppResult;
use crate::modules::config::get_data_dir;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn get_log_dir() -> AppResult<PathBuf> {
    let log_dir = get_data_dir()?.join("logs");

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    Ok(log_dir)
}

/// Initialize logger system
///
/// The returned guard flushes the file writer on drop, keep it alive for the
/// lifetime of the process. Without a usable log directory only the console
/// layer is installed.
pub fn init_logger(default_level: &str) -> Option<WorkerGuard> {
    // Capture log macro logs
    let _ = tracing_log::LogTracer::init();

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    let log_dir = match get_log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to initialize log directory: {}", e);
            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(console_layer)
                .try_init();
            return None;
        }
    };

    // Daily rolling file output
    let file_appender = tracing_appender::rolling::daily(log_dir, "gateway.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    // try_init avoids a crash on re-initialization
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    info!("Logger system initialized (Console + File Persistence)");
    Some(guard)
}
