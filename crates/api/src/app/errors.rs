use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use learnhub_ai::AiError;
use learnhub_auth::{AuthzError, JwtError, PasswordError};
use learnhub_core::DomainError;

/// Everything a handler can fail with; rendered as a JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PasswordError> for ApiError {
    fn from(value: PasswordError) -> Self {
        Self::Internal(value.into())
    }
}

impl From<JwtError> for ApiError {
    fn from(value: JwtError) -> Self {
        Self::Internal(value.into())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Internal(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(e) => domain_error_to_response(e),
            ApiError::Authz(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
            ApiError::Ai(AiError::InvalidInput(msg)) => {
                json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
            }
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        e @ DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        DomainError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
