//! HTTP surface of the conFusion restaurant backend.
//!
//! - [`api`]: axum router, handlers and the auth interceptors
//! - [`config`]: environment-driven server configuration
//! - [`logging`]: tracing subscriber setup and structured event helpers
//! - [`metrics`]: Prometheus counters and histograms

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
