use std::future::Future;

use primitives::retries::retry_with_backoff_if;
use reqwest::{Error as ReqwestError, StatusCode};

/// Whether a failed Discord request is worth another attempt: timeouts, connection failures,
/// rate limiting and server errors.
fn is_transient(err: &ReqwestError) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    err.status().is_some_and(|s| s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS)
}

/// Run a Discord request, retrying transient failures with exponential backoff.
pub(crate) async fn with_retries<F, Fut, T>(request: F) -> Result<T, ReqwestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ReqwestError>>,
{
    retry_with_backoff_if(request, is_transient).await
}
