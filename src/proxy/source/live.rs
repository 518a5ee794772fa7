use async_trait::async_trait;
use std::sync::Arc;

use super::{DataSource, SourceRequest};
use crate::error::AppResult;
use crate::proxy::upstream::{UpstreamClient, UpstreamOutcome};

/// Forwards every request to the GoAPI upstream
pub struct LiveSource {
    upstream: Arc<UpstreamClient>,
}

impl LiveSource {
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl DataSource for LiveSource {
    async fn fetch(&self, request: &SourceRequest) -> AppResult<UpstreamOutcome> {
        Ok(self
            .upstream
            .call(request.method(), request.path(), &request.params())
            .await)
    }

    fn name(&self) -> &'static str {
        "live"
    }
}
