//! Night window policy
//!
//! Pure predicate over local wall-clock time. The window commonly wraps
//! midnight (22:00–06:00); the timezone lives in the scheduler clock, not
//! here, so the policy stays unit-testable independent of the host zone.

use anyhow::{anyhow, Result};
use chrono::NaiveTime;

/// Local-time interval during which recording is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl RecordingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse `HH:MM` or `HH:MM:SS` window bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: parse_time(start)?,
            end: parse_time(end)?,
        })
    }

    /// Whether `now` falls inside the window.
    ///
    /// A wrapping window (`start > end`) covers `[start, midnight)` plus
    /// `[midnight, end)`. A degenerate window (`start == end`) is empty.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.start < self.end {
            self.start <= now && now < self.end
        } else if self.start > self.end {
            now >= self.start || now < self.end
        } else {
            false
        }
    }
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| anyhow!("invalid time of day {s:?} (expected HH:MM)"))
}
