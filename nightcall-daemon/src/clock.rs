//! Scheduler clock
//!
//! All wall-clock reads go through one seam so the scheduler can run under
//! a fixed fake in tests, and so local-time arithmetic uses the configured
//! zone rather than the host's.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current wall-clock time of day in the configured zone.
    fn now_local_time(&self) -> NaiveTime;
}

/// System clock with a fixed IANA zone for the night window.
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for ZonedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local_time(&self) -> NaiveTime {
        Utc::now().with_timezone(&self.tz).time()
    }
}

/// Time remaining until the next full UTC minute boundary.
///
/// Exactly on a boundary this is a full minute, matching a cadence that
/// fires once per boundary rather than twice.
pub fn until_next_minute(now: DateTime<Utc>) -> Duration {
    let into_minute = now.second() as f64 + now.nanosecond() as f64 / 1e9;
    Duration::from_secs_f64((60.0 - into_minute).clamp(0.0, 60.0))
}
