//! Prometheus metrics for monitoring request traffic and authentication.
//!
//! Metrics are recorded through the `metrics` facade and are only exported
//! when a Prometheus listener is installed with [`init_metrics`]; without one
//! the recording calls are no-ops.
//!
//! # Metrics
//!
//! - `http_requests_total{method, path, status}`
//! - `http_request_duration_ms{method, path}`
//! - `login_attempts_total{success}`
//! - `auth_rejections_total{reason}`
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cf_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/users/login", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `path` should be the matched route template so ids do not explode label cardinality.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment rejected-request counter (`missing_token`, `invalid_token`, `not_admin`, ...).
pub fn auth_rejections_total(reason: &'static str) {
    metrics::counter!("auth_rejections_total", "reason" => reason).increment(1);
}
