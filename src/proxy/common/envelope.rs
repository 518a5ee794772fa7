//! Uniform JSON response wrapper
//!
//! - success = true: `data` present, no `error`/`errors`
//! - success = false: `error` and/or `errors` present, no `data`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-field validation messages, ordered by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const VALIDATION_MESSAGE: &str = "The given data was invalid.";
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred while processing the request.";
pub const UNAUTHENTICATED: &str = "Unauthenticated.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl Envelope {
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn failure(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message,
            errors: None,
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self {
            success: false,
            data: None,
            error: None,
            message: Some(VALIDATION_MESSAGE.to_string()),
            errors: Some(errors),
        }
    }

    /// Generic message for callers, detail kept in `error` for diagnosis
    pub fn fault(detail: impl Into<String>) -> Self {
        Self::failure(detail, Some(INTERNAL_MESSAGE.to_string()))
    }
}

/// Envelope paired with its HTTP status
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: StatusCode,
    pub envelope: Envelope,
}

impl ApiReply {
    pub fn new(status: StatusCode, envelope: Envelope) -> Self {
        Self { status, envelope }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, Envelope::invalid(errors))
    }

    pub fn fault(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Envelope::fault(detail))
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            Envelope::failure(UNAUTHENTICATED, None),
        )
    }
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
