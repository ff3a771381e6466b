use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative cancellation signal shared by the orchestrator's per-run
/// worker loop, the Retry Engine's backoff sleep, and the Fix Agent's
/// iteration loop (§5). Checking the token never requires a lock, so it
/// can be polled from inside a tight step-execution loop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` unless cancellation is observed first.
    /// Returns `true` if the sleep completed, `false` if it was cut
    /// short by cancellation — the Retry Engine uses this to decide
    /// whether a backoff sleep should be treated as a cancelled retry.
    pub async fn sleep_or_cancelled(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.wait_for_cancel() => false,
        }
    }

    async fn wait_for_cancel(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
