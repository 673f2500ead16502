//! Rate limiting middleware.
//!
//! Token bucket per client. A client is identified by its peer address, or
//! by the first `X-Forwarded-For` entry when the peer address is unknown or
//! the limiter is configured to trust that header.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;

use crate::errors::AppError;

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// Number of checks between two sweeps of idle buckets.
const SWEEP_EVERY: u64 = 1024;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug, Default)]
struct BucketTable {
    entries: HashMap<String, TokenBucket>,
    checks: u64,
}

impl BucketTable {
    /// Drops buckets untouched for a whole period; they are full again and
    /// indistinguishable from a new one.
    fn sweep(&mut self, now: Instant, period: Duration) {
        let before = self.entries.len();
        self.entries
            .retain(|_, bucket| now.duration_since(bucket.last_refill) < period);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.entries.len(), "idle rate limit buckets evicted");
        }
    }
}

/// Per-client token bucket rate limiter.
///
/// Each client may burst up to `capacity` requests; tokens refill evenly over
/// `period`. A limiter with zero capacity lets every request through.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    buckets: Arc<Mutex<BucketTable>>,
    capacity: u32,
    period: Duration,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `period` for each client.
    pub fn new(max_requests: u32, period: Duration) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(BucketTable::default())),
            capacity: max_requests,
            period,
            trust_forwarded_for: false,
        }
    }

    /// Creates a limiter allowing `max_requests` per minute for each client.
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Keys clients by the first `X-Forwarded-For` entry even when the peer
    /// address is known. Only enable behind a proxy that sets the header.
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    /// Returns whether limiting is active.
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0 && !self.period.is_zero()
    }

    /// Consumes one token for `client`, returning `false` when none is left.
    pub async fn check(&self, client: &str) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let capacity = f64::from(self.capacity);
        let now = Instant::now();
        let mut table = self.buckets.lock().await;

        table.checks += 1;
        if table.checks % SWEEP_EVERY == 0 {
            table.sweep(now, self.period);
        }

        let bucket = table
            .entries
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket {
                tokens: capacity,
                last_refill: now,
            });

        let elapsed = now.duration_since(bucket.last_refill);
        let refill = elapsed.as_secs_f64() / self.period.as_secs_f64() * capacity;
        bucket.tokens = (bucket.tokens + refill).min(capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn client_key(&self, req: &Request) -> String {
        let forwarded = forwarded_for(req);
        if self.trust_forwarded_for {
            if let Some(client) = forwarded {
                return client.to_string();
            }
        }

        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return addr.ip().to_string();
        }

        forwarded.unwrap_or(UNKNOWN_CLIENT).to_string()
    }
}

/// Rate limiting middleware handler.
///
/// Answers `429` with the `FORBIDDEN` error envelope once the client has
/// spent its budget.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let client = limiter.client_key(&req);

    if limiter.check(&client).await {
        next.run(req).await
    } else {
        tracing::warn!(client = %client, uri = %req.uri(), "rate limit exceeded");
        AppError::RateLimited.into_response()
    }
}

fn forwarded_for(req: &Request) -> Option<&str> {
    req.headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
