//! Oracle connection lifecycle.
//!
//! Opens one connection per unit of work, guarantees it is closed on every
//! exit path and normalizes driver failures into [`DatabaseError`].

pub mod error;
pub mod manager;
pub mod oracle_driver;
pub mod session;

// Re-export commonly used types
pub use error::{ConnectorError, DatabaseError, DriverError, UNKNOWN_CODE};
pub use manager::{ConnectionManager, ScopedConnection};
pub use oracle_driver::OracleConnector;
pub use session::{BindParams, BindValue, Connector, Session, StatementOutcome};
