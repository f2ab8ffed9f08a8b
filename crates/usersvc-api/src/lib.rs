//! # usersvc-api — Axum API Service for usersvc
//!
//! HTTP surface over the user store: decodes and validates requests, calls
//! [`usersvc_state::UserStore`], maps outcomes to status codes, and
//! dispatches audit entries off the response path.
//!
//! ## API Surface
//!
//! | Path                  | Module              | Notes                 |
//! |-----------------------|---------------------|-----------------------|
//! | `/api/users`          | [`routes::users`]   | list, create          |
//! | `/api/users/:id`      | [`routes::users`]   | get, replace, delete  |
//! | `/health`             | [`routes::ops`]     | liveness, body `OK`   |
//! | `/health/readiness`   | [`routes::ops`]     | readiness             |
//! | `/metrics`            | [`routes::ops`]     | Prometheus text       |
//! | `/openapi.json`       | [`openapi`]         | generated spec        |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → RateLimitMiddleware (users only) → Handler
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;

use crate::middleware::rate_limit::RateLimiter;
use crate::state::AppState;

pub use error::AppError;

/// Assemble the full application router with all routes and middleware.
///
/// Probes, `/metrics` and `/openapi.json` sit outside the rate limiter but
/// inside the metrics and tracing layers, so every request is observed.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();
    let limiter = RateLimiter::new(state.config.rate_limit_config());

    let api = routes::users::router()
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware));

    Router::new()
        .merge(routes::ops::router())
        .merge(openapi::router())
        .merge(api)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .layer(axum::Extension(limiter))
        .with_state(state)
}
