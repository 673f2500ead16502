//! Process-wide configuration.
//!
//! Values are read from the environment exactly once at startup and are
//! never mutated afterwards. Missing Oracle values default to an empty
//! string; they are not validated here and only fail when a connection is
//! attempted.

use crate::models::connection::ConnectionConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;
const QUERY_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Request-rate limits, in requests per minute per client. Zero disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Limit applied to every route.
    pub default_per_minute: u32,
    /// Additional limit applied to `POST /api/query`.
    pub query_per_minute: u32,
    /// Keys clients by `X-Forwarded-For` instead of the peer address.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            query_per_minute: QUERY_RATE_LIMIT_PER_MINUTE,
            trust_forwarded_for: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address of the HTTP server.
    pub host: String,
    /// Bind port of the HTTP server.
    pub port: u16,
    /// Enables debug-level logging by default.
    pub debug: bool,
    /// Log output format.
    pub log_format: LogFormat,
    /// Bearer token required on the database endpoints, if set.
    pub api_token: Option<String>,
    /// Request-rate limits.
    pub rate_limit: RateLimitConfig,
    /// Oracle connection parameters.
    pub oracle: ConnectionConfig,
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).unwrap_or_default();

        let oracle = ConnectionConfig {
            host: text("ORACLE_HOST"),
            port: text("ORACLE_PORT"),
            sid: text("ORACLE_SID"),
            user: text("ORACLE_USER"),
            password: text("ORACLE_PASSWORD"),
        };

        let rate_limit = RateLimitConfig {
            default_per_minute: lookup("RATE_LIMIT_DEFAULT_PER_MINUTE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT_PER_MINUTE),
            query_per_minute: lookup("RATE_LIMIT_QUERY_PER_MINUTE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(QUERY_RATE_LIMIT_PER_MINUTE),
            trust_forwarded_for: lookup("RATE_LIMIT_TRUST_FORWARDED_FOR")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            host: lookup("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: lookup("APP_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            debug: lookup("APP_DEBUG").map(|v| is_truthy(&v)).unwrap_or(false),
            log_format,
            api_token: lookup("API_TOKEN").filter(|v| !v.is_empty()),
            rate_limit,
            oracle,
        }
    }

    /// Returns the `host:port` the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "t")
}
