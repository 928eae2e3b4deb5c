//! Timeout enforcement.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors and name the operation

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// An operation did not finish before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} timed out after {}s", .after.as_secs())]
pub struct OperationTimeout {
    pub operation: &'static str,
    pub after: Duration,
}

/// Run `fut` with a deadline. The future is dropped when it elapses.
pub async fn with_deadline<F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<F::Output, OperationTimeout>
where
    F: Future,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(output) => Ok(output),
        Err(_) => {
            tracing::warn!(operation, timeout_secs = limit.as_secs(), "Operation timed out");
            Err(OperationTimeout {
                operation,
                after: limit,
            })
        }
    }
}
