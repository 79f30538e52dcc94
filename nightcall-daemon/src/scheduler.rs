//! Recording scheduler
//!
//! The control loop of the daemon:
//!
//! ```text
//! INIT → WAIT_SYNC → ALIGN → { IDLE | RECORDING → GAP } (loop) → SHUTDOWN
//! ```
//!
//! WAIT_SYNC asks the clock-sync gate once with a bounded timeout and
//! proceeds either way. ALIGN waits for one PPS edge, then sleeps to the
//! next full UTC minute (computed from the wall clock, not the edge) to fix
//! a deterministic cadence start. The loop then records inside the night
//! window and idles outside it. Every blocking wait polls the shutdown
//! token at one second granularity or finer; an in-flight capture is killed
//! on shutdown and its metadata marked truncated.

use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use nightcall_capture::{PpsTiming, SegmentMetadata, SegmentRecorder, ShutdownToken};
use nightcall_pps::{PpsSource, SyncGate};

use crate::clock::{until_next_minute, Clock};
use crate::window::RecordingWindow;

/// Timing knobs for the scheduler loop.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub window: RecordingWindow,
    /// Pause between segments.
    pub pause: Duration,
    /// Bound on the startup clock-sync wait.
    pub sync_timeout: Duration,
    /// Bound on the cadence-alignment PPS wait.
    pub align_timeout: Duration,
    /// Bound on the per-segment PPS wait.
    pub start_timeout: Duration,
}

pub struct Scheduler<'a> {
    pps: &'a dyn PpsSource,
    sync: &'a dyn SyncGate,
    recorder: SegmentRecorder<'a>,
    clock: &'a dyn Clock,
    config: SchedulerConfig,
    token: ShutdownToken,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        pps: &'a dyn PpsSource,
        sync: &'a dyn SyncGate,
        recorder: SegmentRecorder<'a>,
        clock: &'a dyn Clock,
        config: SchedulerConfig,
        token: ShutdownToken,
    ) -> Self {
        Self {
            pps,
            sync,
            recorder,
            clock,
            config,
            token,
        }
    }

    /// Run until shutdown.
    ///
    /// Errors are the fatal ones only: filename collisions, a capture tool
    /// that cannot be launched, unwritable metadata. A capture that runs
    /// and exits nonzero is recorded in its metadata and the loop goes on.
    pub fn run(&self) -> Result<()> {
        // WAIT_SYNC
        info!(
            "waiting up to {} s for clock sync",
            self.config.sync_timeout.as_secs()
        );
        if self.sync.wait_for_sync(self.config.sync_timeout) {
            info!("system clock synchronized");
        } else {
            warn!("clock sync not confirmed; continuing unsynchronized");
        }
        if self.token.is_cancelled() {
            return Ok(());
        }

        // ALIGN
        match self.pps.wait_for_edge(self.config.align_timeout) {
            Ok(Some(edge)) => info!(
                "PPS edge observed (sequence {}), aligning cadence",
                edge.sequence
            ),
            Ok(None) => warn!(
                "no PPS edge within {} s; aligning from wall clock only",
                self.config.align_timeout.as_secs()
            ),
            Err(e) => warn!("PPS wait failed: {e}; aligning from wall clock only"),
        }
        self.sleep_to_next_minute();

        while !self.token.is_cancelled() {
            if self.config.window.contains(self.clock.now_local_time()) {
                // RECORDING
                let pps_timing = self.observe_start_edge();
                if self.token.is_cancelled() {
                    break;
                }
                let metadata = self.recorder.record(pps_timing, &self.token)?;
                if metadata.truncated {
                    info!("segment {} truncated by shutdown", metadata.file);
                    break;
                }
                // GAP
                self.token.sleep(self.config.pause);
            } else {
                // IDLE
                self.sleep_to_next_minute();
            }
        }

        info!("scheduler shut down");
        Ok(())
    }

    /// Record a single segment immediately, bypassing sync gating and the
    /// night window. Used by the daemon's one-shot mode.
    pub fn run_once(&self) -> Result<SegmentMetadata> {
        let pps_timing = self.observe_start_edge();
        Ok(self.recorder.record(pps_timing, &self.token)?)
    }

    /// One short PPS wait to pin the segment start to a second boundary.
    /// A timeout or device failure only costs jitter, never the segment.
    fn observe_start_edge(&self) -> Option<PpsTiming> {
        match self.pps.wait_for_edge(self.config.start_timeout) {
            Ok(Some(edge)) => Some(PpsTiming {
                pps_utc_timestamp: edge.utc_seconds,
                clock_offset_ms: edge.clock_offset_ms(),
            }),
            Ok(None) => {
                warn!("no PPS edge before segment start; starting unaligned");
                None
            }
            Err(e) => {
                warn!("PPS wait failed before segment start: {e}");
                None
            }
        }
    }

    fn sleep_to_next_minute(&self) {
        let wait = until_next_minute(self.clock.now_utc());
        self.token.sleep(wait);
    }
}
