//! # Operational Endpoints
//!
//! Health probes and the observability endpoint. Not rate limited.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Build the operational router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(metrics))
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "OK"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// GET /metrics — Prometheus text exposition.
///
/// Uses the installed exporter when there is one, the in-process counters
/// otherwise.
async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let users_stored = state.users.len();
    let body = match &state.prometheus {
        Some(handle) => {
            ::metrics::gauge!("users_stored").set(users_stored as f64);
            handle.render()
        }
        None => state.metrics.render(users_stored),
    };
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body)
}
