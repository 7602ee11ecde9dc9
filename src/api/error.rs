//! Error responses.
//!
//! Every failure leaves the server as `{"error": <message>, "status": <code>}`.
//! Internal failures are logged and reported generically.

use crate::errors::ErrorKind;
use crate::VicatError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by handlers and guard middleware.
#[derive(Debug)]
pub enum ApiError {
    /// A core operation failed.
    Core(VicatError),
    /// The request body was not the expected JSON.
    BadBody(String),
    /// A blocking task panicked or was cancelled.
    Task(String),
}

impl From<VicatError> for ApiError {
    fn from(err: VicatError) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadBody(detail) => {
                tracing::debug!(detail = %detail, "Rejected request body");
                (StatusCode::BAD_REQUEST, detail.clone())
            }
            ApiError::Task(detail) => {
                tracing::error!(detail = %detail, "Blocking task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Core(err) => match err.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, err.to_string()),
                ErrorKind::Auth => (StatusCode::UNAUTHORIZED, err.to_string()),
                ErrorKind::Conflict => (StatusCode::CONFLICT, err.to_string()),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Persistence => {
                    tracing::error!(error = %err, "Internal failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}
