//! Application error types.
//!
//! Every failure that reaches the HTTP boundary is an [`AppError`]; its
//! [`IntoResponse`] implementation renders the error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result type used across the gateway.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned to clients that exceeded their request budget.
pub const RATE_LIMIT_MESSAGE: &str = "request limit exceeded, try again later";

/// Application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or incomplete request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No route or resource matched.
    #[error("not found: {0}")]
    NotFound(String),

    /// Known path, unsupported method. Reported with the `BAD_REQUEST` code.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Client exceeded its request budget.
    #[error("request limit exceeded, try again later")]
    RateLimited,

    /// Unclassified failure. The detail is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// Database connection or statement failure.
    #[error("database error: {0}")]
    DbConnection(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DbConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the error code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) | AppError::MethodNotAllowed(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::RateLimited => "FORBIDDEN",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
            AppError::DbConnection(_) => "DB_CONNECTION_ERROR",
        }
    }

    /// Returns the generic message for this error's code.
    pub fn message(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) | AppError::MethodNotAllowed(_) => {
                "invalid or incomplete data"
            }
            AppError::NotFound(_) => "resource not found",
            AppError::Unauthorized(_) => "authentication required",
            AppError::RateLimited => RATE_LIMIT_MESSAGE,
            AppError::Internal(_) => "internal server error",
            AppError::DbConnection(_) => "database connection error",
        }
    }

    /// Returns the client-visible details, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            AppError::BadRequest(d)
            | AppError::NotFound(d)
            | AppError::MethodNotAllowed(d)
            | AppError::Unauthorized(d)
            | AppError::DbConnection(d) => Some(d.as_str()),
            AppError::RateLimited | AppError::Internal(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Internal(detail) => {
                tracing::error!(code = self.code(), detail = %detail, "request failed")
            }
            _ => tracing::warn!(code = self.code(), error = %self, "request rejected"),
        }

        let body = match self.details() {
            Some(details) => ApiResponse::err_with_details(self.code(), self.message(), details),
            None => ApiResponse::err(self.code(), self.message()),
        };

        (status, Json(body)).into_response()
    }
}
