//! Scoped connection acquisition.
//!
//! [`ConnectionManager::with_connection`] opens one session, lends it to the
//! caller's work and closes it before returning. The session lives inside a
//! [`ScopedConnection`] whose `Drop` performs the close, so it happens
//! exactly once on every exit path: normal return, database error,
//! unclassified error or panic. The whole sequence runs on the blocking
//! pool, which keeps running when the awaiting request is cancelled.

use std::sync::Arc;

use common::models::ConnectionConfig;

use crate::error::{ConnectorError, DatabaseError};
use crate::oracle_driver::OracleConnector;
use crate::session::{BindParams, BindValue, Connector, Session, StatementOutcome};

/// Open database session lent to scoped work.
pub struct ScopedConnection {
    session: Option<Box<dyn Session>>,
}

impl ScopedConnection {
    fn open(connector: &dyn Connector, config: &ConnectionConfig) -> Result<Self, DatabaseError> {
        match connector.connect(config) {
            Ok(session) => {
                tracing::info!(
                    host = %config.host,
                    port = %config.port,
                    sid = %config.sid,
                    "database connection opened"
                );
                Ok(Self {
                    session: Some(session),
                })
            }
            Err(err) => {
                let err = DatabaseError::from_driver(&err);
                tracing::error!(
                    code = %err.code(),
                    message = %err.message(),
                    host = %config.host,
                    "database connection failed"
                );
                Err(err)
            }
        }
    }

    /// Executes one statement with named bind parameters.
    pub fn execute(
        &mut self,
        sql: &str,
        params: &[(String, BindValue)],
    ) -> Result<StatementOutcome, ConnectorError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| ConnectorError::Unexpected("connection already closed".into()))?;

        session.execute(sql, params).map_err(|err| {
            let err = DatabaseError::from_driver(&err);
            tracing::error!(code = %err.code(), message = %err.message(), "statement failed");
            ConnectorError::Database(err)
        })
    }

    fn close(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        match session.close() {
            Ok(()) => tracing::info!("database connection closed"),
            Err(err) => {
                let err = DatabaseError::from_driver(&err);
                tracing::warn!(
                    code = %err.code(),
                    message = %err.message(),
                    "database connection close failed"
                );
            }
        }
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens scoped database connections from the process-wide configuration.
#[derive(Clone)]
pub struct ConnectionManager {
    config: Arc<ConnectionConfig>,
    connector: Arc<dyn Connector>,
}

impl ConnectionManager {
    /// Creates a manager over an arbitrary driver.
    pub fn new(config: Arc<ConnectionConfig>, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Creates a manager over the Oracle driver.
    pub fn oracle(config: Arc<ConnectionConfig>) -> Self {
        Self::new(config, Arc::new(OracleConnector))
    }

    /// Opens a connection, runs `work` with it and closes it.
    ///
    /// Open failures are returned as [`ConnectorError::Database`] without
    /// running `work`. A panic inside `work` is reported as
    /// [`ConnectorError::Unexpected`] after the connection is closed.
    pub async fn with_connection<T, F>(&self, work: F) -> Result<T, ConnectorError>
    where
        F: FnOnce(&mut ScopedConnection) -> Result<T, ConnectorError> + Send + 'static,
        T: Send + 'static,
    {
        let config = Arc::clone(&self.config);
        let connector = Arc::clone(&self.connector);
        let span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let mut conn = ScopedConnection::open(connector.as_ref(), &config)?;
            work(&mut conn)
        })
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "scoped database work aborted");
            ConnectorError::Unexpected(format!("database task failed: {err}"))
        })?
    }

    /// Opens and closes a connection without running a statement.
    pub async fn ping(&self) -> Result<(), ConnectorError> {
        self.with_connection(|_| Ok(())).await
    }

    /// Runs one statement in its own scoped connection.
    pub async fn execute(
        &self,
        sql: impl Into<String>,
        params: BindParams,
    ) -> Result<StatementOutcome, ConnectorError> {
        let sql = sql.into();
        self.with_connection(move |conn| conn.execute(&sql, &params))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        opened: AtomicUsize,
        closed: AtomicUsize,
    }

    struct CountingConnector {
        counters: Arc<Counters>,
        connect_error: Option<DriverError>,
    }

    struct CountingSession {
        counters: Arc<Counters>,
    }

    impl Connector for CountingConnector {
        fn connect(&self, _config: &ConnectionConfig) -> Result<Box<dyn Session>, DriverError> {
            if let Some(err) = &self.connect_error {
                return Err(err.clone());
            }
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingSession {
                counters: Arc::clone(&self.counters),
            }))
        }
    }

    impl Session for CountingSession {
        fn execute(
            &mut self,
            sql: &str,
            _params: &[(String, BindValue)],
        ) -> Result<StatementOutcome, DriverError> {
            if sql.contains("missing_table") {
                return Err(DriverError::new("ORA-00942: table or view does not exist")
                    .with_structured("ORA-00942: table or view does not exist"));
            }
            Ok(StatementOutcome::Rows {
                columns: vec!["1".into()],
                rows: vec![vec![json!(1)]],
            })
        }

        fn close(&mut self) -> Result<(), DriverError> {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager(connect_error: Option<DriverError>) -> (ConnectionManager, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let connector = CountingConnector {
            counters: Arc::clone(&counters),
            connect_error,
        };
        let manager = ConnectionManager::new(
            Arc::new(ConnectionConfig::default()),
            Arc::new(connector),
        );
        (manager, counters)
    }

    fn closed(counters: &Counters) -> usize {
        counters.closed.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_success_closes_once() {
        let (manager, counters) = manager(None);
        let outcome = manager.execute("SELECT 1 FROM DUAL", vec![]).await.unwrap();
        assert!(matches!(outcome, StatementOutcome::Rows { .. }));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(closed(&counters), 1);
    }

    #[tokio::test]
    async fn test_database_error_closes_once() {
        let (manager, counters) = manager(None);
        let err = manager
            .execute("SELECT * FROM missing_table", vec![])
            .await
            .unwrap_err();
        match err {
            ConnectorError::Database(db) => assert_eq!(db.code(), "ORA-00942"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(closed(&counters), 1);
    }

    #[tokio::test]
    async fn test_unexpected_error_closes_once() {
        let (manager, counters) = manager(None);
        let err = manager
            .with_connection(|_| -> Result<(), ConnectorError> {
                Err(ConnectorError::Unexpected("value conversion failed".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Unexpected(_)));
        assert_eq!(closed(&counters), 1);
    }

    #[tokio::test]
    async fn test_panic_closes_once() {
        let (manager, counters) = manager(None);
        let err = manager
            .with_connection(|_| -> Result<(), ConnectorError> { panic!("boom") })
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Unexpected(_)));
        assert_eq!(closed(&counters), 1);
    }

    #[tokio::test]
    async fn test_open_failure_never_runs_work_or_closes() {
        let driver = DriverError::new("ORA-12541: TNS:no listener")
            .with_structured("ORA-12541: TNS:no listener");
        let (manager, counters) = manager(Some(driver));

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_work = Arc::clone(&ran);
        let err = manager
            .with_connection(move |_| {
                ran_in_work.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        match err {
            ConnectorError::Database(db) => {
                assert_eq!(db.pipe_separated(), "ORA-12541 | TNS:no listener")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(closed(&counters), 0);
    }

    #[tokio::test]
    async fn test_ping_opens_and_closes() {
        let (manager, counters) = manager(None);
        manager.ping().await.unwrap();
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(closed(&counters), 1);
    }

    #[tokio::test]
    async fn test_cancelled_request_still_closes() {
        let (manager, counters) = manager(None);

        let slow = manager.with_connection(|_| {
            std::thread::sleep(Duration::from_millis(100));
            Ok(())
        });
        let timed_out = tokio::time::timeout(Duration::from_millis(10), slow).await;
        assert!(timed_out.is_err());

        for _ in 0..100 {
            if closed(&counters) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(closed(&counters), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_use_separate_connections() {
        let (manager, counters) = manager(None);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.ping().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(counters.opened.load(Ordering::SeqCst), 8);
        assert_eq!(closed(&counters), 8);
    }
}
