//! PPS-to-sample alignment calculator
//!
//! Maps a continuous-time PPS edge onto the discrete sample grid of one
//! recorded segment, with nanosecond-resolution residuals. Pure arithmetic
//! over already-persisted metadata; no I/O.

use serde::Serialize;

use nightcall_capture::{PpsTiming, SegmentMetadata};

use crate::error::{AlignError, Result};

/// Alignment of one PPS edge against one segment's sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentResult {
    pub pps_utc_timestamp: f64,
    pub recording_start_timestamp: f64,
    /// Recording start minus pulse time; positive means the recording
    /// started after the pulse.
    pub offset_s: f64,
    pub offset_ns: f64,
    /// Index of the sample captured at the pulse instant; 0 when the pulse
    /// preceded the recording.
    pub pps_sample_index: u64,
    /// True only when the pulse lands on a sample the artifact actually
    /// contains.
    pub pps_within_recording: bool,
    pub sample_rate_hz: u32,
    pub sample_period_ns: f64,
    /// Sub-sample remainder, always in `[0, 1)` regardless of offset sign.
    pub fractional_sample_offset: f64,
    pub fractional_offset_ns: f64,
    pub clock_offset_ms: f64,
    pub precision_ns: f64,
}

impl AlignmentResult {
    pub fn rating(&self) -> PrecisionRating {
        PrecisionRating::from_precision_ns(self.precision_ns)
    }
}

/// Reporting-only classification of alignment precision. Fixed ladder; has
/// no effect on stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PrecisionRating {
    pub fn from_precision_ns(precision_ns: f64) -> Self {
        if precision_ns < 1_000.0 {
            Self::Excellent
        } else if precision_ns < 10_000.0 {
            Self::Good
        } else if precision_ns < 100_000.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for PrecisionRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "EXCELLENT (sub-microsecond)"),
            Self::Good => write!(f, "GOOD (microsecond-level)"),
            Self::Fair => write!(f, "FAIR (tens of microseconds)"),
            Self::Poor => write!(f, "POOR (>100 microseconds)"),
        }
    }
}

/// Compute the alignment of `pps` against `metadata`'s sample grid.
///
/// `total_frames` is the artifact's true frame count, used to bound-check
/// the pulse sample index: an offset that places the pulse past the final
/// captured frame reports `pps_within_recording = false` while keeping the
/// computed index for diagnostics.
///
/// The fractional remainder is normalized with `floor`, so it stays in
/// `[0, 1)` for negative offsets too.
pub fn compute(
    metadata: &SegmentMetadata,
    pps: &PpsTiming,
    total_frames: u64,
) -> Result<AlignmentResult> {
    if metadata.sample_rate_hz == 0 {
        return Err(AlignError::ZeroSampleRate);
    }

    let rate = metadata.sample_rate_hz as f64;
    let recording_start_timestamp = metadata.start_epoch_secs();
    let offset_s = recording_start_timestamp - pps.pps_utc_timestamp;
    let offset_ns = offset_s * 1e9;

    let sample_period_ns = 1e9 / rate;
    let offset_samples = offset_s * rate;

    let (pps_sample_index, pps_within_recording) = if offset_samples < 0.0 {
        // Pulse occurred after the recording started.
        let index = offset_samples.abs().floor() as u64;
        (index, index < total_frames)
    } else {
        // Pulse at or before the recording start: before the first sample.
        (0, false)
    };

    let fractional_sample_offset = offset_samples - offset_samples.floor();
    let fractional_offset_ns = fractional_sample_offset * sample_period_ns;
    let precision_ns = fractional_offset_ns.abs();

    Ok(AlignmentResult {
        pps_utc_timestamp: pps.pps_utc_timestamp,
        recording_start_timestamp,
        offset_s,
        offset_ns,
        pps_sample_index,
        pps_within_recording,
        sample_rate_hz: metadata.sample_rate_hz,
        sample_period_ns,
        fractional_sample_offset,
        fractional_offset_ns,
        clock_offset_ms: pps.clock_offset_ms,
        precision_ns,
    })
}
