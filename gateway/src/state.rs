//! Application state for the gateway.

use std::sync::Arc;

use common::config::AppConfig;
use common::middleware::{ApiToken, RateLimiter};
use connection_manager::ConnectionManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub connections: ConnectionManager,
    pub api_token: ApiToken,
    pub default_limiter: RateLimiter,
    pub query_limiter: RateLimiter,
}

impl AppState {
    /// Creates a new application state backed by Oracle.
    pub fn new(config: &AppConfig) -> Self {
        let oracle = Arc::new(config.oracle.clone());
        Self::with_connections(config, ConnectionManager::oracle(oracle))
    }

    /// Creates a new application state over an arbitrary driver.
    #[cfg(test)]
    pub fn with_connector(
        config: &AppConfig,
        connector: Arc<dyn connection_manager::Connector>,
    ) -> Self {
        let oracle = Arc::new(config.oracle.clone());
        Self::with_connections(config, ConnectionManager::new(oracle, connector))
    }

    fn with_connections(config: &AppConfig, connections: ConnectionManager) -> Self {
        let limits = &config.rate_limit;
        Self {
            connections,
            api_token: ApiToken(config.api_token.clone()),
            default_limiter: RateLimiter::per_minute(limits.default_per_minute)
                .trust_forwarded_for(limits.trust_forwarded_for),
            query_limiter: RateLimiter::per_minute(limits.query_per_minute)
                .trust_forwarded_for(limits.trust_forwarded_for),
        }
    }
}
