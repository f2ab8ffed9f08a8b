//! # Server Configuration
//!
//! Command-line flags, each backed by an environment variable, parsed with
//! `clap`. [`AppConfig::default`] matches the flag defaults so tests can
//! build state without going through the parser.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

use crate::middleware::rate_limit::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "usersvc", version, about = "User management HTTP service")]
pub struct AppConfig {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "USERSVC_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to bind the HTTP server to.
    #[arg(long, env = "USERSVC_PORT", default_value_t = 8081)]
    pub port: u16,

    /// Requests allowed per client per rate-limit window.
    #[arg(long, env = "USERSVC_RATE_LIMIT", default_value_t = 100)]
    pub rate_limit: u64,

    /// Rate-limit window length in seconds.
    #[arg(long, env = "USERSVC_RATE_WINDOW", default_value_t = 1)]
    pub rate_window_secs: u64,

    /// Pending audit entries buffered before new ones are dropped.
    #[arg(long, env = "USERSVC_AUDIT_CAPACITY", default_value_t = 1024)]
    pub audit_capacity: usize,

    /// Emit logs as JSON lines.
    #[arg(long, env = "USERSVC_LOG_JSON")]
    pub log_json: bool,

    /// Install the Prometheus exporter backing `/metrics`.
    #[arg(
        long,
        env = "USERSVC_PROMETHEUS",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub prometheus: bool,
}

impl AppConfig {
    /// Socket address the server listens on.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Rate limiter settings derived from the flags.
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit,
            window: Duration::from_secs(self.rate_window_secs),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8081,
            rate_limit: 100,
            rate_window_secs: 1,
            audit_capacity: 1024,
            log_json: false,
            prometheus: true,
        }
    }
}
