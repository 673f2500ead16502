//! Driver abstraction.
//!
//! A [`Connector`] opens [`Session`]s from a [`ConnectionConfig`]. Both are
//! blocking; the manager runs them on tokio's blocking pool.

use common::models::ConnectionConfig;
use serde_json::Value;

use crate::error::DriverError;

/// Scalar value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

impl BindValue {
    /// Converts a JSON scalar. Arrays and objects yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(BindValue::Null),
            Value::Bool(b) => Some(BindValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(BindValue::Int)
                .or_else(|| n.as_f64().map(BindValue::Float)),
            Value::String(s) => Some(BindValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Named bind parameters, in the order they were supplied.
pub type BindParams = Vec<(String, BindValue)>;

/// What a statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    /// The statement had a column descriptor.
    Rows {
        /// Column names in descriptor order.
        columns: Vec<String>,
        /// Row values in driver order, each aligned with `columns`.
        rows: Vec<Vec<Value>>,
    },
    /// The statement had no column descriptor and was committed.
    Affected(u64),
}

/// Opens database sessions.
pub trait Connector: Send + Sync + 'static {
    /// Opens a session with the given parameters.
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Session>, DriverError>;
}

/// An open database session.
pub trait Session: Send {
    /// Executes one statement with named bind parameters.
    fn execute(&mut self, sql: &str, params: &[(String, BindValue)])
        -> Result<StatementOutcome, DriverError>;

    /// Closes the session. Called exactly once by the manager.
    fn close(&mut self) -> Result<(), DriverError>;
}
