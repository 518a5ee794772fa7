use crate::error::AppResult;
use crate::proxy::config::UpstreamProxyConfig;
use reqwest::{Client, Proxy};

/// Create an HTTP client with a hard request timeout and the optional upstream proxy
pub fn create_client_with_proxy(
    timeout_secs: u64,
    proxy_config: Option<&UpstreamProxyConfig>,
) -> AppResult<Client> {
    let mut builder = Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("goapi-gateway/", env!("CARGO_PKG_VERSION")));

    // Only the configured proxy applies, system proxy variables are ignored
    let mut proxied = false;
    if let Some(config) = proxy_config {
        if config.enabled && !config.url.is_empty() {
            match Proxy::all(&config.url) {
                Ok(proxy) => {
                    builder = builder.proxy(proxy);
                    proxied = true;
                    tracing::info!("HTTP client upstream proxy enabled: {}", config.url);
                }
                Err(e) => {
                    tracing::error!("Invalid proxy address: {}, error: {}", config.url, e);
                }
            }
        }
    }
    if !proxied {
        builder = builder.no_proxy();
    }

    Ok(builder.build()?)
}
