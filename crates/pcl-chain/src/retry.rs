//! Bounded exponential-backoff retry for transient chain RPC errors.

use std::future::Future;
use std::time::Duration;

use crate::error::ChainError;

const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY: Duration = Duration::from_millis(250);
const DELAY_FACTOR: u32 = 2;
const MAX_DELAY: Duration = Duration::from_secs(4);

/// Run `op`, retrying up to [`MAX_ATTEMPTS`] times on transient
/// [`ChainError`]s with delay doubling from [`BASE_DELAY`], capped at
/// [`MAX_DELAY`]. A non-transient error (revert, decode, config) returns
/// immediately without retrying.
pub async fn with_retry<F, Fut, T>(op: F) -> Result<T, ChainError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ChainError>>,
{
    let mut attempt = 0;
    let mut delay = BASE_DELAY;
    loop {
        attempt += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "transient chain error, retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * DELAY_FACTOR).min(MAX_DELAY);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(|| async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(ChainError::Transport("connection reset".into()))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_a_revert() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, ChainError> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ChainError::Reverted("insufficient collateral".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_propagates() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, ChainError> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ChainError::Transport("timeout".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }
}
