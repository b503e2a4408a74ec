use std::time::Duration;

use tokio_retry::{RetryIf, strategy::ExponentialBackoff};

/// The default maximum number of retries for a retryable error.
///
/// With a `DEFAULT_INITIAL_BACKOFF_MS` of 250ms and factor 2 the delays are 250ms, 500ms and 1s.
const DEFAULT_MAX_RETRIES: usize = 3;

/// The default initial backoff time in milliseconds.
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 250;

/// Upper bound for a single backoff delay.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// A retry strategy trait.
pub trait Strategy: Iterator<Item = Duration> + Clone + Send + Sync + 'static {}

/// Implement the Strategy trait for any type that is an iterator of Durations (i.e. all backoffs
/// exported by `tokio_retry`)
impl<T> Strategy for T where T: Iterator<Item = Duration> + Clone + Send + Sync + 'static {}

/// The default backoff used by [`retry_with_backoff_if`].
pub fn default_strategy() -> impl Strategy {
    ExponentialBackoff::from_millis(2)
        .factor(DEFAULT_INITIAL_BACKOFF_MS / 2)
        .max_delay(DEFAULT_MAX_DELAY)
        .take(DEFAULT_MAX_RETRIES)
}

/// Retry the provided async operation using [`ExponentialBackoff`].
///
/// Retries are attempted as long as the provided `condition` returns `true` for
/// the error produced by the operation.
pub async fn retry_with_backoff_if<F, Fut, T, E, C>(op: F, condition: C) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    C: FnMut(&E) -> bool,
{
    retry_with_strategy_if(default_strategy(), op, condition).await
}

/// Same as [`retry_with_backoff_if`] with a caller-provided strategy.
pub async fn retry_with_strategy_if<S, F, Fut, T, E, C>(
    strategy: S,
    op: F,
    condition: C,
) -> Result<T, E>
where
    S: Strategy,
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    C: FnMut(&E) -> bool,
{
    RetryIf::spawn(strategy, op, condition).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast() -> impl Strategy {
        std::iter::repeat(Duration::from_millis(1)).take(3)
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, &str> = retry_with_strategy_if(
            fast(),
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 { Err("transient") } else { Ok(7) }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_on_non_retryable_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), &str> = retry_with_strategy_if(
            fast(),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("fatal")
            },
            |e| *e != "fatal",
        )
        .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_strategy_is_exhausted() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), &str> = retry_with_strategy_if(
            fast(),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("transient")
            },
            |_| true,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
