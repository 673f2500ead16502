//! Shared building blocks of the Oracle query gateway: configuration, error
//! taxonomy, response envelope, models and HTTP middleware.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
