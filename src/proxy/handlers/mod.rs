// Handlers module - API endpoint handlers
//
// Every endpoint runs the same template: validate, fetch from the data
// source, wrap the outcome in an envelope.

pub mod endpoints;
pub mod oauth;

use axum::http::StatusCode;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::proxy::common::envelope::{ApiReply, Envelope};
use crate::proxy::source::{DataSource, SourceRequest};
use crate::proxy::upstream::UpstreamOutcome;

/// Fetch from the data source and map the outcome onto an envelope
///
/// Terminates in exactly one of: success (`success_status`), upstream
/// failure (400) or internal fault (500). Panics inside the source are
/// contained here and never reach the transport layer.
pub async fn dispatch(
    source: &Arc<dyn DataSource>,
    request: SourceRequest,
    success_status: StatusCode,
    success_message: &str,
) -> ApiReply {
    let endpoint = request.path();
    let result = AssertUnwindSafe(source.fetch(&request)).catch_unwind().await;

    match result {
        Ok(Ok(UpstreamOutcome::Ok(data))) => {
            tracing::info!("{} served by {} source", endpoint, source.name());
            ApiReply::new(success_status, Envelope::ok(data, success_message))
        }
        Ok(Ok(UpstreamOutcome::HttpError { status, body })) => {
            tracing::warn!("{} upstream returned HTTP {}", endpoint, status);
            let error = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body
            };
            ApiReply::new(
                StatusCode::BAD_REQUEST,
                Envelope::failure(error, Some(format!("Upstream responded with HTTP {}", status))),
            )
        }
        Ok(Ok(UpstreamOutcome::TransportError(message))) => {
            tracing::warn!("{} upstream unreachable: {}", endpoint, message);
            ApiReply::new(
                StatusCode::BAD_REQUEST,
                Envelope::failure(message, Some("Upstream request failed".to_string())),
            )
        }
        Ok(Err(e)) => {
            tracing::error!("{} data source fault: {}", endpoint, e);
            ApiReply::fault(e.to_string())
        }
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            tracing::error!("{} handler panicked: {}", endpoint, detail);
            ApiReply::fault(detail)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
