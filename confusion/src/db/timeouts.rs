//! Database query timeout helpers
//!
//! Every store call goes through one of these wrappers so a stalled connection
//! turns into a request-scoped failure instead of a hung handler.

use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for a single database call (15 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for a whole transaction (30 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by the persistence layer
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("Duplicate value for {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that does not exist
    #[error("Referenced {0} does not exist")]
    MissingReference(String),
}

impl StoreError {
    /// Map a sqlx error, folding constraint failures into `Conflict` and
    /// `MissingReference`.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(what.to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                StoreError::MissingReference(what.to_string())
            }
            other => StoreError::Database(other),
        }
    }

    /// Reclassify an already wrapped error raised by a write.
    pub fn for_write(self, what: &str) -> Self {
        match self {
            StoreError::Database(err) => StoreError::from_write(err, what),
            other => other,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Execute a query with timeout
///
/// # Arguments
///
/// * `duration` - Timeout duration
/// * `future` - Async operation to execute
///
/// # Example
///
/// ```no_run
/// use confusion::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
///
/// let row = with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("SELECT id FROM users WHERE username = $1")
///         .bind("alice")
///         .fetch_optional(pool)
/// ).await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> StoreResult<T>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(StoreError::Database(e)),
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}

/// Execute a query with the default per-call timeout (15 seconds)
pub async fn with_default_timeout<F, T>(future: F) -> StoreResult<T>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_constants() {
        assert_eq!(DEFAULT_QUERY_TIMEOUT.as_secs(), 15);
        assert_eq!(DEFAULT_TRANSACTION_TIMEOUT.as_secs(), 30);
    }

    #[tokio::test]
    async fn test_timeout_error_display() {
        let err = StoreError::Timeout(Duration::from_secs(15));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("15s"));
    }

    #[tokio::test]
    async fn test_completed_future_passes_through() {
        let result = with_default_timeout(async { Ok::<_, sqlx::Error>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_sqlx_error_is_wrapped() {
        let result =
            with_default_timeout(async { Err::<(), _>(sqlx::Error::RowNotFound) }).await;
        assert!(matches!(result, Err(StoreError::Database(sqlx::Error::RowNotFound))));
    }

    #[tokio::test]
    async fn test_slow_future_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, sqlx::Error>(())
        };
        let result = with_timeout(Duration::from_millis(50), slow).await;
        assert!(matches!(result, Err(StoreError::Timeout(d)) if d == Duration::from_millis(50)));
    }
}
