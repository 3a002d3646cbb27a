//! Cancellable delayed task, used to coalesce bursts of input.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Runs only the most recently scheduled task, once `delay` has passed
/// without another call to [`Debouncer::schedule`].
///
/// At most one task is pending at a time; scheduling replaces (cancels) the
/// previous one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Arm a fresh timer for `task`, cancelling any pending one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!("Debounced task superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    // Fired; no longer pending
                    token.cancel();
                    task.await;
                }
            }
        });
    }

    /// Drop the pending task, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }

    /// True while a scheduled task is still waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
