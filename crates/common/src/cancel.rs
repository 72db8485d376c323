//! Cooperative cancellation for network-issuing operations
//!
//! Every call that reaches the network takes a [`CancellationToken`]. When
//! the token fires first, the in-flight future is dropped and the call
//! fails with a `Timeout`-category [`SdkError`].

use std::future::Future;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{SdkError, SdkResult};

/// Drive `operation` to completion unless `cancel` fires first
///
/// # Errors
/// Returns the operation's own error, or `SdkError::Timeout` carrying the
/// elapsed time when cancelled.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, operation: F) -> SdkResult<T>
where
    F: Future<Output = SdkResult<T>>,
{
    let started = Instant::now();
    if cancel.is_cancelled() {
        return Err(SdkError::cancelled(started.elapsed()));
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(elapsed_ms = started.elapsed().as_millis() as u64, "operation cancelled");
            Err(SdkError::cancelled(started.elapsed()))
        }
        result = operation => result,
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cancel.
    use std::time::Duration;

    use super::*;
    use crate::error::ErrorCategory;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let cancel = CancellationToken::new();
        let value = run_cancellable(&cancel, async { Ok::<_, SdkError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_cancellable(&cancel, async { Ok::<_, SdkError>(()) }).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert_eq!(err.to_string(), "Operation was cancelled");
    }

    #[tokio::test]
    async fn cancellation_interrupts_pending_operation() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = run_cancellable(&cancel, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, SdkError>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, SdkError::Timeout { .. }));
    }
}
