//! # API Route Modules
//!
//! - `users` — CRUD over the user collection (rate limited).
//! - `ops` — liveness/readiness probes and the `/metrics` endpoint.

pub mod ops;
pub mod users;
