//! # Per-Client Rate Limiting
//!
//! Fixed-window request counter keyed by client. Requests over the limit are
//! short-circuited with 429 before they reach a handler.
//!
//! The client key is the `x-client-id` header when present, otherwise the
//! peer IP from `ConnectInfo`, otherwise `"anonymous"`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;

use crate::error::ErrorBody;

/// Buckets are swept for expired windows once the map grows past this size,
/// at most once per window.
const SWEEP_THRESHOLD: usize = 10_000;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(1),
        }
    }
}

/// Per-key rate limit state.
#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

#[derive(Debug)]
struct Buckets {
    by_key: HashMap<String, BucketState>,
    last_sweep: Option<Instant>,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<Buckets>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(Buckets {
                by_key: HashMap::new(),
                last_sweep: None,
            })),
        }
    }

    /// Check if a request from the given key should be allowed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let window = self.config.window;
        let mut buckets = self.buckets.lock();

        let sweep_due = buckets
            .last_sweep
            .map_or(true, |at| now.duration_since(at) >= window);
        if buckets.by_key.len() >= SWEEP_THRESHOLD && sweep_due {
            buckets
                .by_key
                .retain(|_, b| now.duration_since(b.window_start) < window);
            buckets.last_sweep = Some(now);
        }

        let bucket = buckets.by_key.entry(key.to_string()).or_insert(BucketState {
            count: 0,
            window_start: now,
        });

        if now.duration_since(bucket.window_start) >= window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            false
        } else {
            bucket.count += 1;
            true
        }
    }
}

fn client_key(request: &Request) -> String {
    if let Some(id) = request
        .headers()
        .get("x-client-id")
        .and_then(|v| v.to_str().ok())
    {
        return id.to_string();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Middleware that enforces per-client rate limits.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        let key = client_key(&request);
        if !limiter.check(&key) {
            tracing::warn!(client = %key, "rate limit exceeded");
            let body = ErrorBody::new("RATE_LIMITED", "rate limit exceeded");
            return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        }
    }

    next.run(request).await
}
