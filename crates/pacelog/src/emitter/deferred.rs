//! Cancellable one-shot flush task.

use tokio::runtime::Handle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Handle to a scheduled deferred flush.
///
/// Dropping the handle does not cancel the task; call [`cancel`](Self::cancel).
#[derive(Debug)]
pub(crate) struct DeferredFlush {
    token: CancellationToken,
    deadline: Instant,
}

impl DeferredFlush {
    /// Spawn a task on `runtime` that runs `on_fire` at `deadline` unless
    /// cancelled first.
    ///
    /// `on_fire` receives the task's token. Cancellation can race with the
    /// deadline, so `on_fire` must re-check `is_cancelled()` once it holds
    /// whatever lock guards the cancelling side.
    pub(crate) fn schedule<F>(runtime: &Handle, deadline: Instant, on_fire: F) -> Self
    where
        F: FnOnce(&CancellationToken) + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        runtime.spawn(async move {
            tokio::select! {
                biased;
                () = task_token.cancelled() => {
                    trace!("Deferred flush cancelled");
                }
                () = sleep_until(deadline) => {
                    on_fire(&task_token);
                }
            }
        });

        Self { token, deadline }
    }

    pub(crate) const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Cancel the task if it has not fired yet.
    pub(crate) fn cancel(self) {
        self.token.cancel();
    }
}
