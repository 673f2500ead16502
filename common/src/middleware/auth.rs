//! Authentication middleware.
//!
//! Optional static bearer token check for the database endpoints.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

/// Bearer token expected on protected routes. `None` disables the check.
#[derive(Clone, Debug, Default)]
pub struct ApiToken(pub Option<String>);

/// Authentication middleware handler.
///
/// Rejects the request with `UNAUTHORIZED` when a token is configured and
/// the `Authorization: Bearer <token>` header is missing or different.
pub async fn auth_middleware(
    State(token): State<ApiToken>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = token.0.as_deref() else {
        return next.run(req).await;
    };

    match extract_bearer_token(&req) {
        Some(presented) if presented == expected => next.run(req).await,
        Some(_) => AppError::Unauthorized("invalid bearer token".into()).into_response(),
        None => AppError::Unauthorized("missing bearer token".into()).into_response(),
    }
}

/// Extract bearer token from Authorization header.
pub fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}
