//! PPS edge observation via the kernel sysfs assert interface
//!
//! Linux exposes each PPS source under `/sys/class/pps/<name>/assert` as a
//! single line of the form `<seconds>.<nanoseconds>#<sequence>`, updated on
//! every assert edge. Polling that file and watching the sequence counter
//! advance gives edge timestamps without holding the character device open.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{PpsError, Result};

/// Granularity of the sysfs poll loop.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One observed PPS assert edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PpsEdge {
    /// UTC timestamp of the edge in seconds, sub-second precision preserved.
    pub utc_seconds: f64,
    /// Kernel assert sequence counter.
    pub sequence: u64,
}

impl PpsEdge {
    /// Signed distance from the nearest whole UTC second, in milliseconds.
    ///
    /// The pulse marks a true second boundary, so the fractional part of its
    /// system timestamp estimates the local clock error at that instant.
    pub fn clock_offset_ms(&self) -> f64 {
        (self.utc_seconds - self.utc_seconds.round()) * 1e3
    }
}

/// Source of PPS edges.
///
/// `wait_for_edge` blocks the caller until the next edge or the timeout;
/// a timeout is not an error and yields `Ok(None)`. Edge timestamps are
/// non-decreasing across calls on the same source.
pub trait PpsSource {
    fn wait_for_edge(&self, timeout: Duration) -> Result<Option<PpsEdge>>;
}

/// PPS source backed by a sysfs assert file.
///
/// The file is opened and released inside every poll, never held across a
/// sleep. The first call on a fresh device observes the current assert line
/// as a baseline and returns only a subsequent edge.
pub struct PpsDevice {
    assert_path: PathBuf,
    last_sequence: Mutex<Option<u64>>,
}

impl PpsDevice {
    /// Open a PPS source by device path or name (`/dev/pps0` or `pps0`).
    ///
    /// Fails if the device has no sysfs assert interface, which callers
    /// should treat as a configuration error.
    pub fn new(device: &str) -> Result<Self> {
        let name = Path::new(device)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PpsError::device(format!("invalid PPS device path: {device}")))?;

        let assert_path = PathBuf::from(format!("/sys/class/pps/{name}/assert"));
        if !assert_path.exists() {
            return Err(PpsError::device(format!(
                "{device} has no sysfs assert interface at {}",
                assert_path.display()
            )));
        }

        Ok(Self {
            assert_path,
            last_sequence: Mutex::new(None),
        })
    }

    /// Build a source around an explicit assert file. Used by tests and by
    /// deployments with nonstandard sysfs mounts.
    pub fn with_assert_path(assert_path: PathBuf) -> Self {
        Self {
            assert_path,
            last_sequence: Mutex::new(None),
        }
    }

    /// Read and parse the current assert line. An empty file means the
    /// device has not asserted yet.
    fn read_assert(&self) -> Result<Option<PpsEdge>> {
        let contents = fs::read_to_string(&self.assert_path)?;
        let line = contents.trim();
        if line.is_empty() {
            return Ok(None);
        }
        parse_assert_line(line).map(Some)
    }
}

impl PpsSource for PpsDevice {
    fn wait_for_edge(&self, timeout: Duration) -> Result<Option<PpsEdge>> {
        let deadline = Instant::now() + timeout;
        let mut last = self.last_sequence.lock();

        loop {
            if let Some(edge) = self.read_assert()? {
                match *last {
                    Some(prev) if edge.sequence > prev => {
                        *last = Some(edge.sequence);
                        return Ok(Some(edge));
                    }
                    Some(prev) if edge.sequence < prev => {
                        // Counter went backwards (device re-registered);
                        // re-baseline and keep waiting.
                        *last = Some(edge.sequence);
                    }
                    Some(_) => {}
                    None => {
                        *last = Some(edge.sequence);
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// Parse a sysfs assert line: `<seconds>.<nanoseconds>#<sequence>`.
pub fn parse_assert_line(line: &str) -> Result<PpsEdge> {
    let line = line.trim();
    let (stamp, seq) = line
        .split_once('#')
        .ok_or_else(|| PpsError::malformed(line, "missing '#' separator"))?;

    let sequence: u64 = seq
        .trim()
        .parse()
        .map_err(|_| PpsError::malformed(line, "sequence is not an integer"))?;

    let (secs, nanos) = stamp
        .split_once('.')
        .ok_or_else(|| PpsError::malformed(line, "missing '.' in timestamp"))?;

    let secs: i64 = secs
        .parse()
        .map_err(|_| PpsError::malformed(line, "seconds is not an integer"))?;

    if nanos.is_empty() || nanos.len() > 9 || !nanos.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PpsError::malformed(line, "nanoseconds must be 1-9 digits"));
    }
    let mut nanos_val: u64 = nanos
        .parse()
        .map_err(|_| PpsError::malformed(line, "nanoseconds is not an integer"))?;
    // Scale short fractional fields up to nanoseconds.
    for _ in nanos.len()..9 {
        nanos_val *= 10;
    }

    Ok(PpsEdge {
        utc_seconds: secs as f64 + nanos_val as f64 / 1e9,
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn parses_assert_line() {
        let edge = parse_assert_line("1618094938.000000123#42").unwrap();
        assert_eq!(edge.sequence, 42);
        assert!(approx(edge.utc_seconds, 1618094938.000000123, 1e-6));
    }

    #[test]
    fn parses_short_fraction() {
        let edge = parse_assert_line("100.5#1").unwrap();
        assert!(approx(edge.utc_seconds, 100.5, 1e-9));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_assert_line("garbage").is_err());
        assert!(parse_assert_line("100#1").is_err());
        assert!(parse_assert_line("100.abc#1").is_err());
        assert!(parse_assert_line("100.5#x").is_err());
        assert!(parse_assert_line("100.0000000001#1").is_err());
    }

    #[test]
    fn clock_offset_is_signed_distance_to_nearest_second() {
        let late = PpsEdge {
            utc_seconds: 100.0004,
            sequence: 1,
        };
        assert!(approx(late.clock_offset_ms(), 0.4, 1e-6));

        let early = PpsEdge {
            utc_seconds: 99.9996,
            sequence: 2,
        };
        assert!(approx(early.clock_offset_ms(), -0.4, 1e-6));
    }

    #[test]
    fn first_wait_only_baselines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assert");
        fs::write(&path, "100.000000100#7\n").unwrap();

        let dev = PpsDevice::with_assert_path(path.clone());
        // The current line is a baseline, not a fresh edge.
        let edge = dev.wait_for_edge(Duration::from_millis(50)).unwrap();
        assert!(edge.is_none(), "stale assert line must not count as an edge");

        fs::write(&path, "101.000000200#8\n").unwrap();
        let edge = dev
            .wait_for_edge(Duration::from_secs(1))
            .unwrap()
            .expect("sequence advanced, edge expected");
        assert_eq!(edge.sequence, 8);
        assert!(approx(edge.utc_seconds, 101.0000002, 1e-6));
    }

    #[test]
    fn empty_assert_file_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assert");
        fs::write(&path, "").unwrap();

        let dev = PpsDevice::with_assert_path(path);
        let edge = dev.wait_for_edge(Duration::from_millis(30)).unwrap();
        assert!(edge.is_none());
    }

    #[test]
    fn sequence_reset_rebaselines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assert");
        fs::write(&path, "100.000000000#50\n").unwrap();

        let dev = PpsDevice::with_assert_path(path.clone());
        let _ = dev.wait_for_edge(Duration::from_millis(20)).unwrap();

        // Counter reset below the baseline: not an edge by itself.
        fs::write(&path, "200.000000000#3\n").unwrap();
        assert!(dev
            .wait_for_edge(Duration::from_millis(30))
            .unwrap()
            .is_none());

        // The next increment after the reset is.
        fs::write(&path, "201.000000000#4\n").unwrap();
        let edge = dev.wait_for_edge(Duration::from_secs(1)).unwrap().unwrap();
        assert_eq!(edge.sequence, 4);
    }
}
