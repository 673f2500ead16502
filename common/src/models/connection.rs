//! Connection configuration models.
//!
//! Contains the Oracle connection parameters shared by the gateway and the
//! connection manager.

use std::fmt;

/// Oracle connection parameters.
///
/// Built once from the environment at startup and shared read-only for the
/// lifetime of the process.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Listener host.
    pub host: String,
    /// Listener port, kept as text so that invalid values surface at connect time.
    pub port: String,
    /// Oracle system identifier of the instance.
    pub sid: String,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
}

impl ConnectionConfig {
    /// Builds the connect descriptor for this host, port and SID.
    pub fn descriptor(&self) -> String {
        format!(
            "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST={})(PORT={}))(CONNECT_DATA=(SID={})))",
            self.host, self.port, self.sid
        )
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sid", &self.sid)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectionConfig {
        ConnectionConfig {
            host: "db.internal".into(),
            port: "1521".into(),
            sid: "ORCL".into(),
            user: "scott".into(),
            password: "tiger".into(),
        }
    }

    #[test]
    fn test_descriptor_uses_host_port_and_sid() {
        assert_eq!(
            sample().descriptor(),
            "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST=db.internal)(PORT=1521))(CONNECT_DATA=(SID=ORCL)))"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let printed = format!("{:?}", sample());
        assert!(printed.contains("scott"));
        assert!(!printed.contains("tiger"));
    }
}
