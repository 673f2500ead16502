//! Connection and statement errors.
//!
//! Drivers report failures as [`DriverError`]. The manager normalizes them
//! into [`DatabaseError`] before anything outside this crate sees them.

use std::fmt;

use thiserror::Error;

/// Code used when a driver message carries no recognizable code.
pub const UNKNOWN_CODE: &str = "UNKNOWN";

const STRUCTURED_DELIMITER: &str = ": ";
const TERMINATORS: [char; 3] = ['\n', '\r', '.'];

/// Raw failure reported by a database driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    structured: Option<String>,
    raw: String,
}

impl DriverError {
    /// Creates an error with only its stringified form.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            structured: None,
            raw: raw.into(),
        }
    }

    /// Attaches the driver's structured message, e.g. `ORA-12541: TNS:no listener`.
    pub fn with_structured(mut self, message: impl Into<String>) -> Self {
        self.structured = Some(message.into());
        self
    }

    /// Returns the structured message, if the driver provided one.
    pub fn structured(&self) -> Option<&str> {
        self.structured.as_deref()
    }

    /// Returns the stringified error.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::error::Error for DriverError {}

/// Normalized database failure.
///
/// Displays as `<code>: <message>`, or as the bare message when the driver
/// reported no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    code: String,
    message: String,
}

impl DatabaseError {
    /// Normalizes a driver failure.
    ///
    /// The structured message, minus one trailing terminator, is split on its
    /// first `": "`. Without a structured message, a delimiter or a code,
    /// the code is [`UNKNOWN_CODE`] and the message is the raw error.
    pub(crate) fn from_driver(err: &DriverError) -> Self {
        match err.structured().and_then(split_structured) {
            Some((code, message)) => Self {
                code: code.to_string(),
                message: message.to_string(),
            },
            None => Self {
                code: UNKNOWN_CODE.to_string(),
                message: err.raw().to_string(),
            },
        }
    }

    /// Returns the error code, e.g. `ORA-01017`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the error message without its code.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Formats the error as `<code> | <message>`.
    pub fn pipe_separated(&self) -> String {
        format!("{} | {}", self.code, self.message)
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code == UNKNOWN_CODE {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for DatabaseError {}

fn split_structured(message: &str) -> Option<(&str, &str)> {
    let trimmed = message.strip_suffix(TERMINATORS).unwrap_or(message);
    let (code, rest) = trimmed.split_once(STRUCTURED_DELIMITER)?;
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    Some((code, rest))
}

/// Failure of a scoped database operation.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Known failure reported by the database.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Anything else: panics in caller logic, runtime failures, invalid values.
    #[error("{0}")]
    Unexpected(String),
}

impl From<&DriverError> for ConnectorError {
    fn from(err: &DriverError) -> Self {
        ConnectorError::Database(DatabaseError::from_driver(err))
    }
}
