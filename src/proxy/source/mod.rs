// Data sources behind the endpoint handlers
//
// Handlers only know the `DataSource` capability; the deployment picks the
// live upstream or the inline mock once at startup.

pub mod live;
pub mod mock;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::error::AppResult;
use crate::proxy::config::{DataSourceMode, GatewayConfig};
use crate::proxy::upstream::{UpstreamClient, UpstreamOutcome};

pub use live::LiveSource;
pub use mock::MockSource;

/// Validated input for one endpoint call
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRequest {
    Weather { city: String },
    Currency { from: String, to: String },
    News { category: String },
    Data { payload: Map<String, Value> },
}

impl SourceRequest {
    pub fn method(&self) -> Method {
        match self {
            SourceRequest::Data { .. } => Method::POST,
            _ => Method::GET,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            SourceRequest::Weather { .. } => "/weather",
            SourceRequest::Currency { .. } => "/currency",
            SourceRequest::News { .. } => "/news",
            SourceRequest::Data { .. } => "/data",
        }
    }

    /// Upstream parameters; the data payload is forwarded as the body itself
    pub fn params(&self) -> Map<String, Value> {
        let value = match self {
            SourceRequest::Weather { city } => json!({ "city": city }),
            SourceRequest::Currency { from, to } => json!({ "from": from, "to": to }),
            SourceRequest::News { category } => json!({ "category": category }),
            SourceRequest::Data { payload } => return payload.clone(),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Capability shared by live and mock deployments
///
/// `Ok` carries the normalized outcome, including upstream failures.
/// `Err` is reserved for faults inside the source itself.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, request: &SourceRequest) -> AppResult<UpstreamOutcome>;

    fn name(&self) -> &'static str;
}

/// Build the data source selected by configuration
pub fn build_source(config: &GatewayConfig) -> AppResult<Arc<dyn DataSource>> {
    match config.data_source {
        DataSourceMode::Live => {
            let client = UpstreamClient::new(
                &config.upstream,
                config.request_timeout,
                Some(&config.upstream_proxy),
            )?;
            tracing::info!("Using live data source at {}", config.upstream.base_url);
            Ok(Arc::new(LiveSource::new(Arc::new(client))))
        }
        DataSourceMode::Mock => {
            tracing::info!("Using mock data source");
            Ok(Arc::new(MockSource::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_routing() {
        let weather = SourceRequest::Weather {
            city: "Bandung".to_string(),
        };
        assert_eq!(weather.method(), Method::GET);
        assert_eq!(weather.path(), "/weather");
        assert_eq!(Value::Object(weather.params()), json!({ "city": "Bandung" }));

        let currency = SourceRequest::Currency {
            from: "USD".to_string(),
            to: "IDR".to_string(),
        };
        assert_eq!(
            Value::Object(currency.params()),
            json!({ "from": "USD", "to": "IDR" })
        );

        let payload = json!({ "name": "sensor-1", "value": 42 });
        let data = SourceRequest::Data {
            payload: payload.as_object().unwrap().clone(),
        };
        assert_eq!(data.method(), Method::POST);
        assert_eq!(data.path(), "/data");
        assert_eq!(Value::Object(data.params()), payload);
    }

    #[test]
    fn test_build_source_by_mode() {
        let mut config = GatewayConfig::default();
        assert_eq!(build_source(&config).unwrap().name(), "mock");

        config.data_source = DataSourceMode::Live;
        config.upstream.base_url = "http://127.0.0.1:9".to_string();
        config.upstream.api_key = "key".to_string();
        assert_eq!(build_source(&config).unwrap().name(), "live");

        config.upstream.base_url = String::new();
        assert!(build_source(&config).is_err());
    }
}
