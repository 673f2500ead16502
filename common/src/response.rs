//! API response envelope.
//!
//! Every endpoint answers with the same shape: `status`, and either
//! `message`/`data` on success or `error` on failure.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome marker of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The request succeeded.
    Success,
    /// The request failed; see `error`.
    Error,
}

/// Standard API response envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    /// `success` or `error`.
    pub status: ResponseStatus,

    /// Human-readable message (success only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Response data (success only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (failure only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// API error details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code, one of `BAD_REQUEST`, `NOT_FOUND`, `UNAUTHORIZED`,
    /// `FORBIDDEN`, `INTERNAL_SERVER_ERROR`, `DB_CONNECTION_ERROR`.
    #[schema(example = "BAD_REQUEST")]
    pub code: String,

    /// Human-readable error message.
    #[schema(example = "invalid or incomplete data")]
    pub message: String,

    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "a SQL query must be provided")]
    pub details: Option<String>,
}

/// Empty payload for responses that only carry a message.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmptyData;

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn ok(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    /// Creates a successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }
}

impl ApiResponse<EmptyData> {
    /// Creates an error response.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: None,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
                details: None,
            }),
        }
    }

    /// Creates an error response with details.
    pub fn err_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: None,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
                details: Some(details.into()),
            }),
        }
    }
}
