//! Application error type mapping to HTTP status codes.
//!
//! Every error becomes `{"error": {"code": "...", "message": "..."}}`.
//! All errors are request-scoped; none is fatal to the serving process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use conversa_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing request fields. Rejected before reaching
    /// the chat service.
    Validation(String),
    /// Model provider failure (network/auth/quota).
    Llm(LlmError),
    /// Generic internal error.
    Internal(String),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Llm(LlmError::RateLimited { .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Upstream model is rate limiting requests".to_string(),
            ),
            AppError::Llm(LlmError::Overloaded(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_OVERLOADED",
                "Upstream model is overloaded".to_string(),
            ),
            AppError::Llm(e) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
