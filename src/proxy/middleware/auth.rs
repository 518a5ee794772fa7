// Bearer authentication middleware
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::proxy::common::envelope::ApiReply;
use crate::proxy::config::{AuthConfig, AuthMode};
use crate::proxy::token_manager::TokenManager;

/// Decides whether a presented credential may reach the protected routes
pub struct AuthGate {
    mode: AuthMode,
    api_key: String,
    token_manager: Arc<TokenManager>,
}

impl AuthGate {
    pub fn new(config: &AuthConfig, token_manager: Arc<TokenManager>) -> Self {
        Self {
            mode: config.mode,
            api_key: config.api_key.clone(),
            token_manager,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    /// Caller identity for a valid credential
    pub fn authorize(&self, credential: &str) -> Option<String> {
        match self.mode {
            AuthMode::ApiKey => {
                (!self.api_key.is_empty() && credential == self.api_key).then(|| "api_key".to_string())
            }
            AuthMode::ClientCredentials => self.token_manager.verify(credential),
        }
    }
}

/// Parameters of an `Authorization` value whose scheme matches, ignoring case
pub fn strip_auth_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let (found, rest) = value.trim_start().split_once(' ')?;
    found.eq_ignore_ascii_case(scheme).then_some(rest)
}

/// Extract the credential from `Authorization: Bearer` or `x-api-key`
pub fn extract_credential(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| strip_auth_scheme(s, "Bearer"))
        .or_else(|| {
            request
                .headers()
                .get("x-api-key")
                .and_then(|h| h.to_str().ok())
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    request: Request,
    next: Next,
) -> Response {
    tracing::info!("Request: {} {}", request.method(), request.uri());

    let caller = extract_credential(&request).and_then(|credential| gate.authorize(credential));

    match caller {
        Some(caller) => {
            tracing::debug!("Authenticated caller: {}", caller);
            next.run(request).await
        }
        None => {
            tracing::warn!("Unauthenticated request to {}", request.uri().path());
            ApiReply::unauthenticated().into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::config::ClientCredential;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn gate(mode: AuthMode) -> AuthGate {
        let config = AuthConfig {
            mode,
            api_key: "static-key".to_string(),
            clients: vec![ClientCredential {
                client_id: "svc".to_string(),
                client_secret: "pw".to_string(),
            }],
            ..AuthConfig::default()
        };
        AuthGate::new(&config, Arc::new(TokenManager::new(&config)))
    }

    #[test]
    fn test_extract_credential() {
        let bearer = HttpRequest::builder()
            .header(header::AUTHORIZATION, "Bearer abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_credential(&bearer), Some("abc"));

        let api_key = HttpRequest::builder()
            .header("x-api-key", "xyz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_credential(&api_key), Some("xyz"));

        for value in ["bearer abc", "BEARER abc", "Bearer   abc"] {
            let request = HttpRequest::builder()
                .header(header::AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap();
            assert_eq!(extract_credential(&request), Some("abc"), "{}", value);
        }

        let other_scheme = HttpRequest::builder()
            .header(header::AUTHORIZATION, "Bearerabc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_credential(&other_scheme), None);

        let basic = HttpRequest::builder()
            .header(header::AUTHORIZATION, "Basic abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_credential(&basic), None);
    }

    #[test]
    fn test_api_key_mode() {
        let gate = gate(AuthMode::ApiKey);
        assert!(gate.authorize("static-key").is_some());
        assert!(gate.authorize("wrong").is_none());
    }

    #[test]
    fn test_client_credentials_mode() {
        let gate = gate(AuthMode::ClientCredentials);
        // The static key is not a credential in this mode
        assert!(gate.authorize("static-key").is_none());

        let token = gate.token_manager().issue("127.0.0.1", "svc", "pw").unwrap();
        assert_eq!(gate.authorize(&token.access_token).as_deref(), Some("svc"));
    }
}
