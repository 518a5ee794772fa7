// proxy module - authenticated GoAPI gateway

pub mod config;
pub mod server;
pub mod token_manager;

pub mod common; // Envelope, validation, shared tools
pub mod handlers; // API endpoint handlers
pub mod middleware; // Axum middleware
pub mod source; // Live / mock data sources
pub mod upstream; // Upstream client

pub use config::GatewayConfig;
pub use server::{build_router, AppState, AxumServer};
pub use token_manager::TokenManager;
