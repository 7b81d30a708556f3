//! Deadline propagation for store-touching operations.

use std::future::Future;
use std::time::Duration;

use tresora_core::error::TransactionError;

/// Runs `fut` under a deadline, mapping expiry to `TransactionError::Timeout`.
///
/// The wrapped future is dropped when the deadline elapses; any partial work
/// it performed is left for reconciliation.
pub async fn within<F, T>(deadline: Duration, fut: F) -> Result<T, TransactionError>
where
    F: Future<Output = Result<T, TransactionError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransactionError::Timeout),
    }
}
