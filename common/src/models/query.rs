//! SQL query models.
//!
//! Contains the request body of `POST /api/query` and the shape of its result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

/// Message used when the `query` field is missing or empty.
pub const MISSING_QUERY: &str = "a SQL query must be provided";

/// Request body for executing a SQL statement.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    /// SQL statement to execute. Bind variables use the `:name` syntax.
    #[validate(
        required(message = "a SQL query must be provided"),
        length(min = 1, message = "a SQL query must be provided")
    )]
    #[schema(example = "SELECT * FROM employees WHERE department = :dept")]
    pub query: Option<String>,

    /// Bind values keyed by bind name. Values must be JSON scalars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>, example = json!({"dept": "IT"}))]
    pub params: Option<Map<String, Value>>,
}

/// Returns the first human-readable message of a validation failure.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// Result of a SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum QueryResult {
    /// Rows returned by a read, one JSON object per row with keys in column order.
    Rows(Vec<Value>),
    /// Acknowledgment of a write.
    Mutation {
        /// Number of rows affected, as reported by the driver.
        #[serde(rename = "rowsAffected")]
        rows_affected: u64,
    },
}

impl QueryResult {
    /// Maps ordered column names and row values into row objects.
    ///
    /// Surplus values in a row are ignored; missing ones are left out.
    pub fn from_rows(columns: &[String], rows: Vec<Vec<Value>>) -> Self {
        let mapped = rows
            .into_iter()
            .map(|row| {
                let object: Map<String, Value> = columns.iter().cloned().zip(row).collect();
                Value::Object(object)
            })
            .collect();
        QueryResult::Rows(mapped)
    }

    /// Creates a write acknowledgment.
    pub fn affected(rows_affected: u64) -> Self {
        QueryResult::Mutation { rows_affected }
    }
}
