//! Request error taxonomy and HTTP response mapping.
//!
//! Four caller-visible error kinds cover the whole submission pipeline:
//! bad input (400), bot-blocked (403), operator misconfiguration (503),
//! and external delivery failure (500). Internal detail is logged at the
//! point of failure and never echoed back to the caller.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from a form submission handler.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad or missing caller input. The message is safe to return.
    #[error("{0}")]
    Validation(String),

    /// The submission gate rejected the request as automated traffic.
    #[error("Request blocked")]
    Blocked,

    /// A required delivery credential or address is not configured.
    /// Detected before any external call is attempted.
    #[error("Service not configured: {0}")]
    Configuration(&'static str),

    /// An external delivery service failed after validation passed.
    /// The caller sees a generic message; `detail` is logged only.
    #[error("Delivery failed")]
    Delivery {
        service: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Blocked => StatusCode::FORBIDDEN,
            ApiError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Delivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing error message. Validation messages pass through;
    /// everything else is generic.
    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Blocked => "Request blocked".to_string(),
            ApiError::Configuration(_) => "Service temporarily unavailable".to_string(),
            ApiError::Delivery { .. } => "Failed to process request".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::Validation(msg) => {
                tracing::info!(error = %msg, "submission_validation_failed");
            }
            ApiError::Blocked => {
                tracing::warn!("submission_blocked");
            }
            ApiError::Configuration(what) => {
                tracing::error!(missing = what, "submission_configuration_error");
            }
            ApiError::Delivery { service, detail } => {
                tracing::error!(service = service, detail = %detail, "submission_delivery_failed");
            }
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}
