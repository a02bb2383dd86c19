//! Structured logging configuration.
//!
//! Console output through `tracing-subscriber`, with helpers for the events the
//! server reports in a fixed shape: security rejections, completed requests and
//! slow store calls. Library `log` records are forwarded by the subscriber's
//! log bridge.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Store calls slower than this are reported as warnings
const SLOW_QUERY_MS: u64 = 100;

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use cf_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use cf_server::logging::log_security_event;
///
/// log_security_event(
///     "invalid_token",
///     None,
///     Some("GET /favorites"),
///     "Bearer token failed verification"
/// );
/// ```
pub fn log_security_event(
    event_type: &str,
    user_id: Option<i64>,
    route: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        route = route,
        "SECURITY: {}",
        message
    );
}

/// Log a store round trip, warning when it is slow
pub fn log_database_operation(operation: &str, duration_ms: u64) {
    tracing::debug!(
        operation = operation,
        duration_ms = duration_ms,
        "Database operation"
    );

    if duration_ms > SLOW_QUERY_MS {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Slow database operation detected"
        );
    }
}

/// Log API request/response
pub fn log_api_request(
    request_id: &str,
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
) {
    tracing::info!(
        request_id = request_id,
        http_method = method,
        http_path = path,
        http_status = status_code,
        duration_ms = duration_ms,
        "API request completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("not_admin", Some(1), Some("DELETE /dishes"), "Test message");
        log_security_event("missing_token", None, None, "Test message");
    }

    #[test]
    fn test_log_database_operation() {
        log_database_operation("ping", 5);
        log_database_operation("ping", SLOW_QUERY_MS + 50);
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("abc", "GET", "/dishes", 200, 45);
        log_api_request("def", "POST", "/users/login", 401, 120);
    }
}
