//! Batch analysis over stored segment/metadata pairs
//!
//! Enumerates artifacts in a directory, pairs each with its metadata by
//! filename stem, and aggregates alignment precision. A broken pair is a
//! per-item warning, never an abort: one bad segment must not hide a
//! night's worth of good ones.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use nightcall_capture::SegmentMetadata;

use crate::alignment::{self, AlignmentResult};
use crate::error::{AlignError, Result};
use crate::wav::{self, WavInfo};

/// Everything known about one analyzed segment.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub wav_path: PathBuf,
    pub info: WavInfo,
    pub metadata: SegmentMetadata,
    /// None when the metadata carries no `pps_timing` record.
    pub alignment: Option<AlignmentResult>,
}

/// Aggregate precision statistics over a batch of alignments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub count: usize,
    pub mean_ns: f64,
    pub min_ns: f64,
    pub max_ns: f64,
    /// Population standard deviation.
    pub stddev_ns: f64,
}

/// Analyze a single artifact, requiring its sibling metadata record.
pub fn analyze_file(wav_path: &Path) -> Result<FileReport> {
    let json_path = wav_path.with_extension("json");
    if !json_path.exists() {
        return Err(AlignError::MissingMetadata(json_path));
    }

    let metadata = SegmentMetadata::load(&json_path)?;
    let info = wav::read_info(wav_path)?;

    let alignment = match &metadata.pps_timing {
        Some(timing) => Some(alignment::compute(&metadata, timing, info.n_frames)?),
        None => None,
    };

    Ok(FileReport {
        wav_path: wav_path.to_path_buf(),
        info,
        metadata,
        alignment,
    })
}

/// Analyze every artifact in `dir`, sorted by filename.
///
/// Pairs missing their metadata or with an unreadable artifact are skipped
/// with a warning. Pairs without `pps_timing` are reported but contribute
/// no alignment.
pub fn analyze_dir(dir: &Path) -> Result<Vec<FileReport>> {
    let mut wav_paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
        })
        .collect();
    wav_paths.sort();

    let mut reports = Vec::new();
    for wav_path in wav_paths {
        match analyze_file(&wav_path) {
            Ok(report) => {
                if report.alignment.is_none() {
                    warn!(
                        "{}: metadata has no pps_timing, alignment skipped",
                        wav_path.display()
                    );
                }
                reports.push(report);
            }
            Err(e) => warn!("skipping {}: {e}", wav_path.display()),
        }
    }
    Ok(reports)
}

/// Summarize a sequence of precision values, in nanoseconds.
pub fn summarize(precisions_ns: &[f64]) -> Option<BatchSummary> {
    if precisions_ns.is_empty() {
        return None;
    }

    let count = precisions_ns.len();
    let mean = precisions_ns.iter().sum::<f64>() / count as f64;
    let min = precisions_ns.iter().copied().fold(f64::INFINITY, f64::min);
    let max = precisions_ns
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let variance = precisions_ns
        .iter()
        .map(|p| (p - mean).powi(2))
        .sum::<f64>()
        / count as f64;

    Some(BatchSummary {
        count,
        mean_ns: mean,
        min_ns: min,
        max_ns: max,
        stddev_ns: variance.sqrt(),
    })
}

/// Summary over the reports that produced an alignment.
pub fn summarize_reports(reports: &[FileReport]) -> Option<BatchSummary> {
    let precisions: Vec<f64> = reports
        .iter()
        .filter_map(|r| r.alignment.as_ref())
        .map(|a| a.precision_ns)
        .collect();
    summarize(&precisions)
}
