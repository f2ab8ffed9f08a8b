//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Built once at startup; every clone shares the
//! same store, audit channel and counters.

use metrics_exporter_prometheus::PrometheusHandle;
use usersvc_state::UserStore;

use crate::audit::{AuditLog, AuditWriter, TracingAuditWriter};
use crate::config::AppConfig;
use crate::middleware::metrics::ApiMetrics;

/// Shared application state accessible to all route handlers.
///
/// Custom `Debug` reports only whether an exporter is attached.
#[derive(Clone)]
pub struct AppState {
    /// The user collection. The only shared mutable domain resource.
    pub users: UserStore,
    /// Fire-and-forget audit dispatch.
    pub audit: AuditLog,
    /// In-process request counters.
    pub metrics: ApiMetrics,
    /// Prometheus exporter handle, when one was installed at startup.
    pub prometheus: Option<PrometheusHandle>,
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("users", &self.users.len())
            .field("audit", &self.audit)
            .field("metrics", &self.metrics)
            .field("prometheus", &self.prometheus.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// Create state with an empty store and the tracing audit writer.
    ///
    /// # Panics
    ///
    /// Must be called inside a tokio runtime (the audit worker is spawned here).
    pub fn new(config: AppConfig) -> Self {
        let audit = AuditLog::spawn(TracingAuditWriter, config.audit_capacity);
        Self::with_audit(config, audit)
    }

    /// Create state with an empty store and a custom audit writer.
    pub fn with_audit_writer<W: AuditWriter>(config: AppConfig, writer: W) -> Self {
        let audit = AuditLog::spawn(writer, config.audit_capacity);
        Self::with_audit(config, audit)
    }

    /// Create state around an existing audit handle.
    pub fn with_audit(config: AppConfig, audit: AuditLog) -> Self {
        Self {
            users: UserStore::new(),
            audit,
            metrics: ApiMetrics::new(),
            prometheus: None,
            config,
        }
    }

    /// Attach an installed Prometheus exporter.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
