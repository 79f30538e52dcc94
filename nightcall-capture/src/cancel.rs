//! Cooperative shutdown token
//!
//! A shared boolean settable from a signal handler and polled by every
//! blocking wait in the recording path. Cancellation is coarse and
//! cooperative: shutdown latency is bounded by the polling granularity,
//! one second at most.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest uninterruptible sleep slice; bounds shutdown latency.
const MAX_SLICE: Duration = Duration::from_secs(1);

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Safe to call from any thread, including signal
    /// handling tasks; idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` in slices of at most one second, giving up as
    /// soon as cancellation is observed. Returns true if the full duration
    /// elapsed, false if cancelled first.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(MAX_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_completes_when_not_cancelled() {
        let token = ShutdownToken::new();
        let start = Instant::now();
        assert!(token.sleep(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn sleep_aborts_within_a_slice_of_cancellation() {
        let token = ShutdownToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });

        let start = Instant::now();
        let completed = token.sleep(Duration::from_secs(30));
        let elapsed = start.elapsed();
        handle.join().unwrap();

        assert!(!completed, "cancelled sleep must report interruption");
        assert!(
            elapsed < Duration::from_millis(1500),
            "shutdown latency exceeded the 1 s polling bound: {elapsed:?}"
        );
    }

    #[test]
    fn cancelled_token_does_not_sleep() {
        let token = ShutdownToken::new();
        token.cancel();
        let start = Instant::now();
        assert!(!token.sleep(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
