// Upstream client implementation
// Every call yields an UpstreamOutcome, failures are never raised to the caller

use reqwest::{header, Client, Method};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::proxy::config::{UpstreamConfig, UpstreamProxyConfig};

const API_KEY_HEADER: &str = "X-API-Key";

/// Result of one outbound call
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// 2xx with a JSON body
    Ok(Value),
    /// Non-2xx response (or a 2xx body that is not JSON)
    HttpError { status: u16, body: String },
    /// Connection, timeout or body read failure
    TransportError(String),
}

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
    api_key: header::HeaderValue,
}

impl UpstreamClient {
    pub fn new(
        upstream: &UpstreamConfig,
        timeout_secs: u64,
        proxy_config: Option<&UpstreamProxyConfig>,
    ) -> AppResult<Self> {
        let http_client = crate::utils::http::create_client_with_proxy(timeout_secs, proxy_config)?;
        Self::with_client(http_client, upstream)
    }

    pub fn with_client(http_client: Client, upstream: &UpstreamConfig) -> AppResult<Self> {
        let base_url = upstream.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            AppError::Config(format!("Invalid upstream base URL {:?}: {}", base_url, e))
        })?;

        let mut api_key = header::HeaderValue::from_str(&upstream.api_key)
            .map_err(|e| AppError::Config(format!("Invalid upstream API key: {}", e)))?;
        api_key.set_sensitive(true);

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    /// Build upstream URL
    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue one call and normalize its outcome
    ///
    /// GET sends `params` as the query string, any other method sends them as a JSON body.
    pub async fn call(&self, method: Method, path: &str, params: &Map<String, Value>) -> UpstreamOutcome {
        let url = self.build_url(path);

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header(API_KEY_HEADER, self.api_key.clone())
            .header(header::ACCEPT, "application/json");

        request = if method == Method::GET {
            request.query(&query_pairs(params))
        } else {
            request.json(params)
        };

        tracing::debug!("Upstream {} {}", method, url);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Upstream {} {} failed: {}", method, url, e);
                return UpstreamOutcome::TransportError(format!("HTTP request failed: {}", e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return UpstreamOutcome::TransportError(format!("Failed to read response: {}", e))
            }
        };

        if !status.is_success() {
            tracing::warn!("Upstream {} {} returned {}", method, url, status);
            return UpstreamOutcome::HttpError {
                status: status.as_u16(),
                body,
            };
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(json) => UpstreamOutcome::Ok(json),
            Err(e) => {
                tracing::warn!("Upstream {} {} returned non-JSON body: {}", method, url, e);
                UpstreamOutcome::HttpError {
                    status: status.as_u16(),
                    body,
                }
            }
        }
    }
}

/// Flatten parameters into query pairs, strings are sent without JSON quoting
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
