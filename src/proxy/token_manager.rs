// OAuth2 client-credentials token store
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::proxy::common::rate_limiter::RateLimiter;
use crate::proxy::common::utils::{generate_random_id, sha256_hex};
use crate::proxy::config::{AuthConfig, ClientCredential};

const ACCESS_TOKEN_LEN: usize = 48;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub client_id: String,
    pub expiry_timestamp: i64,
}

/// RFC 6749 token response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// RFC 6749 section 5.2 error codes, plus the endpoint throttle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Missing or malformed request parameter: {0}")]
    InvalidRequest(String),

    #[error("Client authentication failed")]
    InvalidClient,

    #[error("Grant type {0:?} is not supported")]
    UnsupportedGrantType(String),

    #[error("Too many token requests, slow down")]
    TooManyRequests,
}

impl OAuthError {
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::InvalidRequest(_) => "invalid_request",
            OAuthError::InvalidClient => "invalid_client",
            OAuthError::UnsupportedGrantType(_) => "unsupported_grant_type",
            OAuthError::TooManyRequests => "too_many_requests",
        }
    }
}

pub struct TokenManager {
    tokens: Arc<DashMap<String, IssuedToken>>, // sha256(access_token) -> IssuedToken
    clients: HashMap<String, String>,          // client_id -> sha256(client_secret)
    token_ttl: i64,
    limiter: RateLimiter,
}

impl TokenManager {
    /// Create new TokenManager
    pub fn new(config: &AuthConfig) -> Self {
        let clients = config
            .clients
            .iter()
            .map(|ClientCredential { client_id, client_secret }| {
                (client_id.clone(), sha256_hex(client_secret))
            })
            .collect();

        Self {
            tokens: Arc::new(DashMap::new()),
            clients,
            token_ttl: config.token_ttl,
            limiter: RateLimiter::per_minute(config.token_requests_per_minute),
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Issue a token for a registered client
    ///
    /// `caller` identifies who is asking (the peer address), the throttle
    /// budget is spent per caller so guesses never lock out the named client.
    pub fn issue(
        &self,
        caller: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, OAuthError> {
        if !self.limiter.check(caller) {
            tracing::warn!("Token endpoint throttled for caller {}", caller);
            return Err(OAuthError::TooManyRequests);
        }
        if client_id.is_empty() {
            return Err(OAuthError::InvalidRequest("client_id".to_string()));
        }

        match self.clients.get(client_id) {
            Some(expected) if *expected == sha256_hex(client_secret) => {}
            _ => {
                tracing::warn!("Rejected token request for client {} from {}", client_id, caller);
                return Err(OAuthError::InvalidClient);
            }
        }

        self.purge_expired();

        let access_token = generate_random_id(ACCESS_TOKEN_LEN);
        let now = chrono::Utc::now().timestamp();
        self.tokens.insert(
            sha256_hex(&access_token),
            IssuedToken {
                client_id: client_id.to_string(),
                expiry_timestamp: now + self.token_ttl,
            },
        );

        tracing::info!("Issued access token for client {}", client_id);

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_ttl,
        })
    }

    /// Client id owning a live token; expired tokens are dropped on sight
    pub fn verify(&self, access_token: &str) -> Option<String> {
        let key = sha256_hex(access_token);
        let now = chrono::Utc::now().timestamp();

        let client_id = {
            let token = self.tokens.get(&key)?;
            if token.expiry_timestamp > now {
                return Some(token.client_id.clone());
            }
            token.client_id.clone()
        };

        self.tokens.remove(&key);
        tracing::debug!("Access token for client {} expired", client_id);
        None
    }

    /// Drop every expired token, returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = chrono::Utc::now().timestamp();
        let before = self.tokens.len();
        self.tokens.retain(|_, token| token.expiry_timestamp > now);
        before - self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALLER: &str = "127.0.0.1";

    fn config(ttl: i64, per_minute: u32) -> AuthConfig {
        AuthConfig {
            clients: vec![ClientCredential {
                client_id: "reporting".to_string(),
                client_secret: "s3cret".to_string(),
            }],
            token_ttl: ttl,
            token_requests_per_minute: per_minute,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let manager = TokenManager::new(&config(3600, 60));
        let token = manager.issue(CALLER, "reporting", "s3cret").unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(manager.verify(&token.access_token).as_deref(), Some("reporting"));
        assert_eq!(manager.verify("forged"), None);
    }

    #[test]
    fn test_wrong_secret_or_unknown_client() {
        let manager = TokenManager::new(&config(3600, 60));
        assert_eq!(manager.issue(CALLER, "reporting", "nope"), Err(OAuthError::InvalidClient));
        assert_eq!(manager.issue(CALLER, "other", "s3cret"), Err(OAuthError::InvalidClient));
        assert!(matches!(manager.issue(CALLER, "", "s3cret"), Err(OAuthError::InvalidRequest(_))));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_expired_token_rejected_and_removed() {
        let manager = TokenManager::new(&config(0, 60));
        let token = manager.issue(CALLER, "reporting", "s3cret").unwrap();
        assert_eq!(manager.len(), 1);

        assert_eq!(manager.verify(&token.access_token), None);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let manager = TokenManager::new(&config(-1, 60));
        manager.issue(CALLER, "reporting", "s3cret").unwrap();
        assert_eq!(manager.purge_expired(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_throttle() {
        let manager = TokenManager::new(&config(3600, 2));
        assert!(manager.issue(CALLER, "reporting", "s3cret").is_ok());
        assert!(manager.issue(CALLER, "reporting", "bad").is_err());
        assert_eq!(
            manager.issue(CALLER, "reporting", "s3cret"),
            Err(OAuthError::TooManyRequests)
        );
    }

    #[test]
    fn test_wrong_guesses_do_not_lock_out_the_client() {
        let manager = TokenManager::new(&config(3600, 60));
        for _ in 0..60 {
            assert_eq!(
                manager.issue("203.0.113.9", "reporting", "guess"),
                Err(OAuthError::InvalidClient)
            );
        }
        assert_eq!(
            manager.issue("203.0.113.9", "reporting", "s3cret"),
            Err(OAuthError::TooManyRequests)
        );

        // The real client calls from its own address
        assert!(manager.issue(CALLER, "reporting", "s3cret").is_ok());
    }

    #[test]
    fn test_unknown_client_ids_share_the_caller_window() {
        let manager = TokenManager::new(&config(3600, 100_000));
        for i in 0..10_000 {
            let _ = manager.issue(CALLER, &format!("junk-{}", i), "x");
        }
        assert_eq!(manager.limiter.len(), 1);
    }
}
