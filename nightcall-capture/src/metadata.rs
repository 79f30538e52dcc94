//! Per-segment metadata
//!
//! One JSON object per recorded segment, written next to the audio artifact
//! with the same filename stem. Created once at segment completion and never
//! modified afterwards; analyzers may read concurrently with an active
//! recorder because writes go through a temp file and rename.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// PPS observation taken just before the capture was launched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PpsTiming {
    /// UTC timestamp of the pulse edge, seconds with sub-second fraction.
    pub pps_utc_timestamp: f64,
    /// Estimated system clock error at the edge, milliseconds.
    pub clock_offset_ms: f64,
}

/// Metadata record for one recorded segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    /// Audio artifact filename (no directory).
    pub file: String,
    pub utc_start: DateTime<Utc>,
    pub utc_end: DateTime<Utc>,
    pub sample_rate_hz: u32,
    pub bits: u16,
    pub channels: u16,
    /// Configured segment duration, not measured from the artifact.
    pub duration_s: f64,
    /// Exit code of the capture tool; nonzero flags under-runs or failure.
    pub arecord_rc: i32,
    /// True when the capture was killed by shutdown instead of running to
    /// its configured duration. Absent in records written before the flag
    /// existed, which parse as false.
    #[serde(default)]
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pps_timing: Option<PpsTiming>,
}

impl SegmentMetadata {
    /// Recording start as an epoch timestamp with sub-second fraction.
    pub fn start_epoch_secs(&self) -> f64 {
        self.utc_start.timestamp() as f64 + self.utc_start.timestamp_subsec_nanos() as f64 / 1e9
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Persist atomically: write to a sibling temp file, then rename, so a
    /// concurrent reader never observes a partial record.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> SegmentMetadata {
        SegmentMetadata {
            file: "NFC_20250413T020000Z.wav".to_string(),
            utc_start: Utc.with_ymd_and_hms(2025, 4, 13, 2, 0, 0).unwrap(),
            utc_end: Utc.with_ymd_and_hms(2025, 4, 13, 2, 59, 55).unwrap(),
            sample_rate_hz: 48000,
            bits: 16,
            channels: 1,
            duration_s: 3595.0,
            arecord_rc: 0,
            truncated: false,
            pps_timing: Some(PpsTiming {
                pps_utc_timestamp: 1744509599.9997900,
                clock_offset_ms: -0.21,
            }),
        }
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        for key in [
            "\"file\"",
            "\"utc_start\"",
            "\"utc_end\"",
            "\"sample_rate_hz\"",
            "\"bits\"",
            "\"channels\"",
            "\"duration_s\"",
            "\"arecord_rc\"",
            "\"truncated\"",
            "\"pps_timing\"",
            "\"pps_utc_timestamp\"",
            "\"clock_offset_ms\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn utc_timestamps_use_z_suffix() {
        let json = serde_json::to_value(&sample()).unwrap();
        let start = json["utc_start"].as_str().unwrap();
        assert!(start.ends_with('Z'), "expected Z suffix, got {start}");
    }

    #[test]
    fn round_trips() {
        let meta = sample();
        let json = serde_json::to_string(&meta).unwrap();
        let back: SegmentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn pps_timing_omitted_when_absent() {
        let mut meta = sample();
        meta.pps_timing = None;
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("pps_timing"));
    }

    #[test]
    fn legacy_records_without_truncated_parse_as_false() {
        let json = r#"{
            "file": "NFC_20241201T120000Z.wav",
            "utc_start": "2024-12-01T12:00:00Z",
            "utc_end": "2024-12-01T12:59:55Z",
            "sample_rate_hz": 48000,
            "bits": 16,
            "channels": 1,
            "duration_s": 3595,
            "arecord_rc": 0
        }"#;
        let meta: SegmentMetadata = serde_json::from_str(json).unwrap();
        assert!(!meta.truncated);
        assert!(meta.pps_timing.is_none());
        assert_eq!(meta.duration_s, 3595.0);
    }

    #[test]
    fn start_epoch_keeps_subsecond_fraction() {
        let mut meta = sample();
        meta.utc_start = Utc.timestamp_opt(100, 250_000_000).unwrap();
        let epoch = meta.start_epoch_secs();
        assert!((epoch - 100.25).abs() < 1e-9);
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NFC_20250413T020000Z.json");
        sample().write_atomic(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let back = SegmentMetadata::load(&path).unwrap();
        assert_eq!(back, sample());
    }
}
