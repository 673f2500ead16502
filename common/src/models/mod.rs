//! Shared data models.

pub mod connection;
pub mod query;

// Re-export commonly used types
pub use connection::ConnectionConfig;
pub use query::{QueryRequest, QueryResult};
