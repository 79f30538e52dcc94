//! Segment recorder
//!
//! Runs one fixed-duration capture, brackets it with wall-clock UTC
//! timestamps, and persists the metadata record. The artifact and metadata
//! filenames derive deterministically from the UTC start at second
//! resolution; a same-second collision is fatal rather than an overwrite.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cancel::ShutdownToken;
use crate::error::{CaptureError, Result};
use crate::metadata::{PpsTiming, SegmentMetadata};
use crate::tool::{CaptureSpec, CaptureTool};

/// Granularity of the capture completion poll; keeps kill latency well
/// under the one second shutdown bound.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Filename stem for a segment starting at `utc_start`, second resolution.
pub fn segment_stem(utc_start: DateTime<Utc>) -> String {
    utc_start.format("NFC_%Y%m%dT%H%M%SZ").to_string()
}

pub struct SegmentRecorder<'a> {
    tool: &'a dyn CaptureTool,
    spec: CaptureSpec,
    output_dir: PathBuf,
}

impl<'a> SegmentRecorder<'a> {
    pub fn new(tool: &'a dyn CaptureTool, spec: CaptureSpec, output_dir: PathBuf) -> Self {
        Self {
            tool,
            spec,
            output_dir,
        }
    }

    pub fn spec(&self) -> &CaptureSpec {
        &self.spec
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Record one segment and persist its metadata.
    ///
    /// Blocks for the configured duration, polling the shutdown token; on
    /// cancellation the capture is killed and the metadata is written with
    /// `truncated: true`. The duration recorded is the configured one, not
    /// a measurement of the artifact; the capture tool's exit code is
    /// surfaced so callers can detect under-runs.
    pub fn record(
        &self,
        pps_timing: Option<PpsTiming>,
        token: &ShutdownToken,
    ) -> Result<SegmentMetadata> {
        let utc_start = Utc::now();
        let stem = segment_stem(utc_start);
        let wav_path = self.output_dir.join(format!("{stem}.wav"));
        let json_path = self.output_dir.join(format!("{stem}.json"));

        if wav_path.exists() || json_path.exists() {
            return Err(CaptureError::Collision(wav_path));
        }

        info!(
            "recording {} ({} s at {} Hz)",
            wav_path.display(),
            self.spec.duration_secs,
            self.spec.sample_rate_hz
        );

        let mut handle = self.tool.start(&self.spec, &wav_path)?;
        let (rc, truncated) = loop {
            if let Some(rc) = handle.try_wait()? {
                break (rc, false);
            }
            if token.is_cancelled() {
                warn!("shutdown requested, killing in-flight capture");
                break (handle.kill()?, true);
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        };
        let utc_end = Utc::now();

        if rc != 0 && !truncated {
            warn!("capture tool exited with rc {rc} for {stem}");
        }

        let metadata = SegmentMetadata {
            file: format!("{stem}.wav"),
            utc_start,
            utc_end,
            sample_rate_hz: self.spec.sample_rate_hz,
            bits: self.spec.bits,
            channels: self.spec.channels,
            duration_s: self.spec.duration_secs as f64,
            arecord_rc: rc,
            truncated,
            pps_timing,
        };
        metadata.write_atomic(&json_path)?;

        info!("finished {} (rc {rc})", wav_path.display());
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    /// Capture fake: touches the output file and completes after a fixed
    /// number of polls, or hangs until killed.
    struct FakeTool {
        polls_until_done: usize,
        hang_until_killed: bool,
        killed: Arc<AtomicBool>,
    }

    struct FakeHandle {
        remaining: usize,
        hang: bool,
        killed: Arc<AtomicBool>,
    }

    impl CaptureTool for FakeTool {
        fn start(
            &self,
            _spec: &CaptureSpec,
            out: &Path,
        ) -> Result<Box<dyn crate::tool::CaptureHandle>> {
            fs::write(out, b"RIFF").unwrap();
            Ok(Box::new(FakeHandle {
                remaining: self.polls_until_done,
                hang: self.hang_until_killed,
                killed: self.killed.clone(),
            }))
        }
    }

    impl crate::tool::CaptureHandle for FakeHandle {
        fn try_wait(&mut self) -> Result<Option<i32>> {
            if self.hang {
                return Ok(None);
            }
            if self.remaining == 0 {
                Ok(Some(0))
            } else {
                self.remaining -= 1;
                Ok(None)
            }
        }

        fn kill(&mut self) -> Result<i32> {
            self.killed.store(true, Ordering::SeqCst);
            Ok(-1)
        }
    }

    fn spec() -> CaptureSpec {
        CaptureSpec {
            device: "hw:1,0".to_string(),
            sample_rate_hz: 48000,
            bits: 16,
            channels: 1,
            duration_secs: 2,
        }
    }

    #[test]
    fn writes_artifact_and_metadata_with_matching_stem() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FakeTool {
            polls_until_done: 1,
            hang_until_killed: false,
            killed: Arc::new(AtomicBool::new(false)),
        };
        let recorder = SegmentRecorder::new(&tool, spec(), dir.path().to_path_buf());

        let meta = recorder.record(None, &ShutdownToken::new()).unwrap();

        let stem = meta.file.trim_end_matches(".wav").to_string();
        assert!(dir.path().join(format!("{stem}.wav")).exists());
        assert!(dir.path().join(format!("{stem}.json")).exists());
        assert_eq!(meta.arecord_rc, 0);
        assert!(!meta.truncated);
        assert_eq!(meta.duration_s, 2.0);
        assert!(meta.utc_start <= meta.utc_end);

        let loaded = SegmentMetadata::load(&dir.path().join(format!("{stem}.json"))).unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn carries_pps_timing_into_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FakeTool {
            polls_until_done: 0,
            hang_until_killed: false,
            killed: Arc::new(AtomicBool::new(false)),
        };
        let recorder = SegmentRecorder::new(&tool, spec(), dir.path().to_path_buf());

        let timing = PpsTiming {
            pps_utc_timestamp: 1744509600.0002,
            clock_offset_ms: 0.2,
        };
        let meta = recorder.record(Some(timing), &ShutdownToken::new()).unwrap();
        assert_eq!(meta.pps_timing, Some(timing));
    }

    #[test]
    fn same_second_collision_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FakeTool {
            polls_until_done: 0,
            hang_until_killed: false,
            killed: Arc::new(AtomicBool::new(false)),
        };
        let recorder = SegmentRecorder::new(&tool, spec(), dir.path().to_path_buf());

        // Pre-create the artifacts this second's segment could claim; cover
        // the next second too in case the clock rolls over mid-test.
        let now = Utc::now();
        for t in [now, now + chrono::Duration::seconds(1)] {
            let stem = segment_stem(t);
            fs::write(dir.path().join(format!("{stem}.wav")), b"RIFF").unwrap();
        }

        let result = recorder.record(None, &ShutdownToken::new());
        assert!(matches!(result, Err(CaptureError::Collision(_))));
    }

    #[test]
    fn shutdown_kills_capture_and_marks_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let killed = Arc::new(AtomicBool::new(false));
        let tool = FakeTool {
            polls_until_done: 0,
            hang_until_killed: true,
            killed: killed.clone(),
        };
        let recorder = SegmentRecorder::new(&tool, spec(), dir.path().to_path_buf());

        let token = ShutdownToken::new();
        let canceller = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            canceller.cancel();
        });

        let start = Instant::now();
        let meta = recorder.record(None, &token).unwrap();
        let elapsed = start.elapsed();
        handle.join().unwrap();

        assert!(killed.load(Ordering::SeqCst), "capture must be killed");
        assert!(meta.truncated);
        assert_eq!(meta.arecord_rc, -1);
        assert!(
            elapsed < Duration::from_secs(1),
            "kill latency exceeded the shutdown bound: {elapsed:?}"
        );
    }
}
