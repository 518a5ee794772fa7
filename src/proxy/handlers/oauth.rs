// OAuth2 token endpoint (client-credentials grant)
use axum::{
    extract::{rejection::FormRejection, ConnectInfo, Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;

use crate::proxy::middleware::auth::strip_auth_scheme;
use crate::proxy::server::AppState;
use crate::proxy::token_manager::OAuthError;

const CLIENT_CREDENTIALS: &str = "client_credentials";

/// Throttle key for requests served without a peer address (in-process routers)
const UNKNOWN_CALLER: &str = "unknown";

/// Throttle key for the requesting peer
fn caller_key(connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CALLER.to_string())
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[allow(dead_code)]
    pub scope: Option<String>,
}

/// Decode `Authorization: Basic base64(client_id:client_secret)`
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let encoded = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|value| strip_auth_scheme(value, "Basic"))?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, secret) = decoded.split_once(':')?;
    Some((id.to_string(), secret.to_string()))
}

fn oauth_error(error: OAuthError) -> Response {
    let status = match error {
        OAuthError::InvalidRequest(_) | OAuthError::UnsupportedGrantType(_) => StatusCode::BAD_REQUEST,
        OAuthError::InvalidClient => StatusCode::UNAUTHORIZED,
        OAuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
    };
    (
        status,
        Json(json!({
            "error": error.code(),
            "error_description": error.to_string(),
        })),
    )
        .into_response()
}

/// POST /oauth/token
pub async fn handle_token(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let caller = caller_key(connect_info);

    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            tracing::warn!("Malformed token request: {}", e);
            return oauth_error(OAuthError::InvalidRequest(e.body_text()));
        }
    };

    match form.grant_type.as_deref() {
        Some(CLIENT_CREDENTIALS) => {}
        Some(other) => return oauth_error(OAuthError::UnsupportedGrantType(other.to_string())),
        None => return oauth_error(OAuthError::InvalidRequest("grant_type".to_string())),
    }

    // Form credentials take precedence over HTTP Basic
    let credentials = match (form.client_id, form.client_secret) {
        (Some(id), Some(secret)) => Some((id, secret)),
        _ => basic_credentials(&headers),
    };
    let Some((client_id, client_secret)) = credentials else {
        return oauth_error(OAuthError::InvalidRequest("client_id".to_string()));
    };

    match state.auth.token_manager().issue(&caller, &client_id, &client_secret) {
        Ok(token) => (
            StatusCode::OK,
            [(header::CACHE_CONTROL, "no-store")],
            Json(token),
        )
            .into_response(),
        Err(e) => oauth_error(e),
    }
}
