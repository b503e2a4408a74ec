use std::{
    future::Future,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use futures::FutureExt;
use tokio::signal::unix::{Signal, SignalKind};
use tracing::debug;

/// Resolves when the process receives SIGINT or SIGTERM.
pub struct ShutdownSignal {
    /// A future that resolves when a SIGINT signal is received.
    ctrl_c: Pin<Box<dyn Future<Output = io::Result<()>> + Send>>,
    /// A stream of SIGTERM signals.
    term_signal: Signal,
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal").finish_non_exhaustive()
    }
}

impl ShutdownSignal {
    /// Install the signal handlers. Must be called from within a Tokio runtime.
    pub fn new() -> io::Result<Self> {
        let ctrl_c = Box::pin(tokio::signal::ctrl_c());
        let term_signal = tokio::signal::unix::signal(SignalKind::terminate())?;
        Ok(Self { ctrl_c, term_signal })
    }
}

impl Future for ShutdownSignal {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.ctrl_c.poll_unpin(cx).is_ready() {
            debug!("Received SIGINT signal");
            return Poll::Ready(());
        }

        if this.term_signal.poll_recv(cx).is_ready() {
            debug!("Received SIGTERM signal");
            return Poll::Ready(());
        }

        Poll::Pending
    }
}

/// How [`run_until_shutdown`] finished.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome<O> {
    /// The future completed on its own
    Completed(O),
    /// The shutdown future fired first; the work future was dropped
    Interrupted,
}

/// Drive `fut` until it completes or `shutdown` resolves, then run `on_shutdown`.
///
/// `on_shutdown` runs in both cases so callers can release resources in one place.
pub async fn run_until_shutdown<F, S, C, CF, O>(
    fut: F,
    shutdown: S,
    on_shutdown: C,
) -> RunOutcome<O>
where
    F: Future<Output = O>,
    S: Future<Output = ()>,
    C: FnOnce() -> CF,
    CF: Future<Output = ()>,
{
    let outcome = tokio::select! {
        // NOTE: wrap with a `Box` so we don't allocate a
        // huge future state machine on the stack.
        result = Box::pin(fut) => RunOutcome::Completed(result),
        () = shutdown => {
            debug!("Shutdown signal received");
            RunOutcome::Interrupted
        }
    };
    on_shutdown().await;
    outcome
}
