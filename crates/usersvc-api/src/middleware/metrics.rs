//! # Request Metrics
//!
//! Observes every request's method, matched path, status and latency
//! without altering the response. Counts land in two places: in-process
//! atomic counters on [`ApiMetrics`], which back the `/metrics` fallback,
//! and the `metrics` facade, which feeds the Prometheus exporter when one
//! is installed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;

/// How often the Prometheus exporter drains histogram samples.
pub const UPKEEP_PERIOD: Duration = Duration::from_secs(5);

/// Shared metrics state.
#[derive(Debug, Clone)]
pub struct ApiMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return current request count.
    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Return current error count (4xx and 5xx).
    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Render the in-process counters in Prometheus text exposition format.
    pub fn render(&self, users_stored: usize) -> String {
        format!(
            "# TYPE http_requests_total counter\n\
             http_requests_total {}\n\
             # TYPE http_errors_total counter\n\
             http_errors_total {}\n\
             # TYPE users_stored gauge\n\
             users_stored {}\n",
            self.requests(),
            self.errors(),
            users_stored,
        )
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Run exporter upkeep on a fixed period so histogram buckets are drained
/// whether or not anything scrapes `/metrics`.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Label value for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

/// The `path` label for a request: the route template, never the raw URI,
/// so the label set stays bounded by the number of routes.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned())
}

/// Middleware that records request counts, status and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status();

    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        if status.is_server_error() || status.is_client_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    let status = status.as_u16().to_string();
    ::metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    ::metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(latency);

    response
}
