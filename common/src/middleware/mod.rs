//! Middleware components shared by the HTTP services.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

// Re-export commonly used types
pub use auth::{auth_middleware, ApiToken};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};
