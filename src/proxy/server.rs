use axum::{
    extract::{ConnectInfo, DefaultBodyLimit},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::add_extension::AddExtension;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::proxy::config::{AuthMode, GatewayConfig};
use crate::proxy::middleware::AuthGate;
use crate::proxy::source::{self, DataSource};
use crate::proxy::token_manager::TokenManager;

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DataSource>,
    pub auth: Arc<AuthGate>,
}

impl AppState {
    pub fn new(source: Arc<dyn DataSource>, auth: Arc<AuthGate>) -> Self {
        Self { source, auth }
    }

    /// Wire the data source and auth gate selected by configuration
    pub fn from_config(config: &GatewayConfig) -> AppResult<Self> {
        let source = source::build_source(config)?;
        let token_manager = Arc::new(TokenManager::new(&config.auth));
        let auth = Arc::new(AuthGate::new(&config.auth, token_manager.clone()));

        if config.auth.mode == AuthMode::ClientCredentials && token_manager.client_count() == 0 {
            tracing::warn!("Client-credentials auth enabled but no clients are registered");
        }

        Ok(Self::new(source, auth))
    }
}

/// Build the route table
///
/// The token endpoint is only mounted in client-credentials mode; the
/// four GoAPI routes always sit behind the auth gate.
pub fn build_router(state: AppState) -> Router {
    use crate::proxy::handlers;

    let protected = Router::new()
        .route("/weather", get(handlers::endpoints::handle_weather))
        .route("/currency", get(handlers::endpoints::handle_currency))
        .route("/news", get(handlers::endpoints::handle_news))
        .route("/data", post(handlers::endpoints::handle_data))
        .route_layer(axum::middleware::from_fn_with_state(
            state.auth.clone(),
            crate::proxy::middleware::auth_middleware,
        ));

    let mut app = Router::new()
        .merge(protected)
        .route("/healthz", get(health_check_handler));

    if state.auth.mode() == AuthMode::ClientCredentials {
        app = app.route("/oauth/token", post(handlers::oauth::handle_token));
    }

    app.layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(crate::proxy::middleware::cors_layer())
        .with_state(state)
}

/// Axum server instance
pub struct AxumServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: std::net::SocketAddr,
}

impl AxumServer {
    /// Start Axum server
    pub async fn start(
        host: &str,
        port: u16,
        state: AppState,
    ) -> AppResult<(Self, tokio::task::JoinHandle<()>)> {
        let app = build_router(state);

        // Bind address
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Server(format!("Failed to bind address {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Gateway server started at http://{}", local_addr);

        // Create shutdown channel
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_instance = Self {
            shutdown_tx: Some(shutdown_tx),
            local_addr,
        };

        // Start server in new task
        let handle = tokio::spawn(async move {
            use hyper::server::conn::http1;
            use hyper_util::rt::TokioIo;
            use hyper_util::service::TowerToHyperService;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, peer)) => {
                                let io = TokioIo::new(stream);
                                // Peer address feeds the token endpoint throttle
                                let service = TowerToHyperService::new(AddExtension::new(
                                    app.clone(),
                                    ConnectInfo(peer),
                                ));

                                tokio::task::spawn(async move {
                                    if let Err(err) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection handling finished or errored: {:?}", err);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {:?}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Gateway server stopped listening");
                        break;
                    }
                }
            }
        });

        Ok((server_instance, handle))
    }

    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Stop server
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Health check handler
async fn health_check_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok"
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_and_stop() {
        let state = AppState::from_config(&GatewayConfig::default()).unwrap();
        let (server, handle) = AxumServer::start("127.0.0.1", 0, state).await.unwrap();

        let url = format!("http://{}/healthz", server.local_addr());
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let body: serde_json::Value = client
            .get(&url)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");

        server.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_token_endpoint_over_socket() {
        use crate::proxy::config::ClientCredential;

        let mut config = GatewayConfig::default();
        config.auth.mode = AuthMode::ClientCredentials;
        config.auth.token_requests_per_minute = 1;
        config.auth.clients = vec![ClientCredential {
            client_id: "svc".to_string(),
            client_secret: "pw".to_string(),
        }];
        let state = AppState::from_config(&config).unwrap();
        let (server, handle) = AxumServer::start("127.0.0.1", 0, state).await.unwrap();

        let url = format!("http://{}/oauth/token", server.local_addr());
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", "svc"),
            ("client_secret", "pw"),
        ];

        let first = client.post(&url).form(&form).send().await.unwrap();
        assert_eq!(first.status(), reqwest::StatusCode::OK);

        // Same peer address, budget of one per minute
        let second = client.post(&url).form(&form).send().await.unwrap();
        assert_eq!(second.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);

        server.stop();
        handle.await.unwrap();
    }
}
