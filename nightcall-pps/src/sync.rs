//! Clock synchronization gate
//!
//! Asks the chrony daemon whether the system clock is disciplined before the
//! first recording is scheduled. Synchronization is advisory: every failure
//! mode reports "not synced" and the caller continues in degraded mode.

use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::debug;

/// Bounded check against an external time-sync daemon.
pub trait SyncGate {
    /// Returns true once the daemon reports the clock synchronized, false on
    /// timeout or on any failure to ask. Never an error.
    fn wait_for_sync(&self, timeout: Duration) -> bool;
}

/// Sync gate backed by `chronyc waitsync`.
pub struct ChronySync {
    program: String,
}

impl ChronySync {
    pub fn new() -> Self {
        Self {
            program: "chronyc".to_string(),
        }
    }

    /// Override the chronyc binary. Used by tests.
    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ChronySync {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncGate for ChronySync {
    fn wait_for_sync(&self, timeout: Duration) -> bool {
        // waitsync polls once a second, so the try count doubles as a
        // timeout in seconds.
        let tries = timeout.as_secs().max(1).to_string();
        let status = Command::new(&self.program)
            .args(["waitsync", &tries])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("could not invoke {}: {}", self.program, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exit_means_synced() {
        let gate = ChronySync::with_program("true");
        assert!(gate.wait_for_sync(Duration::from_secs(1)));
    }

    #[test]
    fn failure_exit_means_not_synced() {
        let gate = ChronySync::with_program("false");
        assert!(!gate.wait_for_sync(Duration::from_secs(1)));
    }

    #[test]
    fn missing_binary_means_not_synced() {
        let gate = ChronySync::with_program("/nonexistent/chronyc");
        assert!(!gate.wait_for_sync(Duration::from_secs(1)));
    }
}
