//! Oracle driver.
//!
//! Blocking [`Connector`] over the `oracle` crate (ODPI-C). The Oracle
//! client libraries are loaded at runtime, on the first connect.

use common::models::ConnectionConfig;
use oracle::sql_type::{OracleType, ToSql};
use oracle::{Connection, SqlValue};
use serde_json::{Number, Value};

use crate::error::DriverError;
use crate::session::{BindValue, Connector, Session, StatementOutcome};

impl From<oracle::Error> for DriverError {
    fn from(err: oracle::Error) -> Self {
        let structured = err.db_error().map(|db| db.message().to_string());
        let driver = DriverError::new(err.to_string());
        match structured {
            Some(message) => driver.with_structured(message),
            None => driver,
        }
    }
}

/// Connects to Oracle through a TCP connect descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleConnector;

impl Connector for OracleConnector {
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Session>, DriverError> {
        let conn = Connection::connect(&config.user, &config.password, config.descriptor())?;
        Ok(Box::new(OracleSession { conn }))
    }
}

struct OracleSession {
    conn: Connection,
}

impl Session for OracleSession {
    fn execute(
        &mut self,
        sql: &str,
        params: &[(String, BindValue)],
    ) -> Result<StatementOutcome, DriverError> {
        let binds: Vec<(&str, OracleBind)> = params
            .iter()
            .map(|(name, value)| (name.trim_start_matches(':'), OracleBind::from(value)))
            .collect();
        let named: Vec<(&str, &dyn ToSql)> = binds
            .iter()
            .map(|(name, value)| (*name, value.as_to_sql()))
            .collect();

        let mut stmt = self.conn.statement(sql).build()?;

        if stmt.is_query() {
            let result_set = stmt.query_named(&named)?;
            let columns: Vec<String> = result_set
                .column_info()
                .iter()
                .map(|info| info.name().to_string())
                .collect();

            let mut rows = Vec::new();
            for row in result_set {
                let row = row?;
                let values = row
                    .sql_values()
                    .iter()
                    .map(column_value)
                    .collect::<oracle::Result<Vec<_>>>()?;
                rows.push(values);
            }

            Ok(StatementOutcome::Rows { columns, rows })
        } else {
            stmt.execute_named(&named)?;
            let affected = stmt.row_count()?;
            self.conn.commit()?;
            Ok(StatementOutcome::Affected(affected))
        }
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.conn.close()?;
        Ok(())
    }
}

/// Owned bind value in a type the driver can bind.
enum OracleBind {
    Null(Option<String>),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OracleBind {
    fn as_to_sql(&self) -> &dyn ToSql {
        match self {
            OracleBind::Null(v) => v,
            OracleBind::Int(v) => v,
            OracleBind::Float(v) => v,
            OracleBind::Text(v) => v,
        }
    }
}

impl From<&BindValue> for OracleBind {
    fn from(value: &BindValue) -> Self {
        match value {
            BindValue::Null => OracleBind::Null(None),
            // NUMBER(1) convention; BOOLEAN columns only exist from 23ai onwards
            BindValue::Bool(b) => OracleBind::Int(i64::from(*b)),
            BindValue::Int(i) => OracleBind::Int(*i),
            BindValue::Float(f) => OracleBind::Float(*f),
            BindValue::Text(s) => OracleBind::Text(s.clone()),
        }
    }
}

fn column_value(value: &SqlValue) -> oracle::Result<Value> {
    if value.is_null()? {
        return Ok(Value::Null);
    }

    match value.oracle_type()? {
        OracleType::Number(_, _)
        | OracleType::Float(_)
        | OracleType::BinaryFloat
        | OracleType::BinaryDouble
        | OracleType::Int64
        | OracleType::UInt64 => {
            let text: String = value.get()?;
            Ok(number_from_text(&text))
        }
        OracleType::Boolean => Ok(Value::Bool(value.get()?)),
        _ => Ok(Value::String(value.get()?)),
    }
}

/// Parses Oracle's textual number into a JSON number, keeping the text when
/// it is not representable (e.g. `~` for infinity or 38-digit values).
fn number_from_text(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}
