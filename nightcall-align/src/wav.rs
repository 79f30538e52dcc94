//! WAV artifact inspection
//!
//! The analyzer only needs the container header: frame count for the
//! alignment bounds check, plus the format fields for the report.

use std::path::Path;

use crate::error::Result;

/// Header-level description of one audio artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bits: u16,
    /// Frames (samples per channel) actually present in the artifact.
    pub n_frames: u64,
    pub duration_s: f64,
}

pub fn read_info(path: &Path) -> Result<WavInfo> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let n_frames = reader.duration() as u64;
    let duration_s = if spec.sample_rate > 0 {
        n_frames as f64 / spec.sample_rate as f64
    } else {
        0.0
    };

    Ok(WavInfo {
        sample_rate_hz: spec.sample_rate,
        channels: spec.channels,
        bits: spec.bits_per_sample,
        n_frames,
        duration_s,
    })
}
