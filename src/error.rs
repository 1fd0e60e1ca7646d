//! Error handling module
//!
//! HTTP-facing error type and its response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::domain::DomainError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    // Mapped to 401 or 500 depending on the cause
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: String,
    pub error_code: String,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),

            AppError::Domain(domain_err) => {
                let status = match domain_err {
                    DomainError::UserNotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::ItemNotFound(_)
                    | DomainError::InsufficientFunds
                    | DomainError::InvalidAmount(_)
                    | DomainError::SelfTransfer => StatusCode::BAD_REQUEST,
                    DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, domain_err.code())
            }

            AppError::Auth(auth_err) if auth_err.is_unauthorized() => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            AppError::Auth(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let errors = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            errors,
            error_code: error_code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
