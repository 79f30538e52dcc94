//! Human-readable analysis reports

use std::fs;

use chrono::DateTime;

use crate::batch::{BatchSummary, FileReport};

/// Format an epoch timestamp with millisecond resolution.
fn fmt_epoch(epoch_secs: f64) -> String {
    let secs = epoch_secs.floor();
    let nanos = ((epoch_secs - secs) * 1e9).round() as u32;
    match DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3fZ").to_string(),
        None => format!("{epoch_secs:.6}"),
    }
}

pub fn print_file_report(report: &FileReport) {
    let name = report
        .wav_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.wav_path.display().to_string());

    println!("\n{}", "=".repeat(60));
    println!("Artifact: {name}");
    println!(
        "  Duration: {:.3} s ({:.2} min)",
        report.info.duration_s,
        report.info.duration_s / 60.0
    );
    println!("  Sample rate: {} Hz", report.info.sample_rate_hz);
    println!("  Frames: {}", report.info.n_frames);
    println!("  Channels: {}", report.info.channels);
    println!("  Bits: {}", report.info.bits);
    if let Ok(meta) = fs::metadata(&report.wav_path) {
        println!("  File size: {} bytes", meta.len());
    }
    if report.metadata.truncated {
        println!("  NOTE: capture truncated by shutdown");
    }
    if report.metadata.arecord_rc != 0 {
        println!("  NOTE: capture tool rc {}", report.metadata.arecord_rc);
    }

    let alignment = match &report.alignment {
        Some(a) => a,
        None => {
            println!("\n  No PPS timing data in metadata; alignment unavailable");
            return;
        }
    };

    println!("\nTiming:");
    println!(
        "  PPS edge (UTC):        {}",
        fmt_epoch(alignment.pps_utc_timestamp)
    );
    println!(
        "  Recording start (UTC): {}",
        fmt_epoch(alignment.recording_start_timestamp)
    );
    println!(
        "  PPS to start offset: {:.9} s ({:.0} ns)",
        alignment.offset_s, alignment.offset_ns
    );
    println!("  System clock offset: {:.1} ms", alignment.clock_offset_ms);

    println!("\nSample alignment:");
    println!("  Sample period: {:.1} ns", alignment.sample_period_ns);
    println!("  PPS sample index: {}", alignment.pps_sample_index);
    println!(
        "  PPS within recording: {}",
        if alignment.pps_within_recording {
            "yes"
        } else {
            "no"
        }
    );
    println!(
        "  Fractional sample: {:.6}",
        alignment.fractional_sample_offset
    );
    println!(
        "  Fractional offset: {:.1} ns",
        alignment.fractional_offset_ns
    );
    println!(
        "  Precision: {:.1} ns [{}]",
        alignment.precision_ns,
        alignment.rating()
    );
}

pub fn print_summary(summary: &BatchSummary) {
    println!("\n{}", "=".repeat(60));
    println!("Summary:");
    println!("  Segments analyzed: {}", summary.count);
    println!("  Mean precision: {:.1} ns", summary.mean_ns);
    println!("  Best precision: {:.1} ns", summary.min_ns);
    println!("  Worst precision: {:.1} ns", summary.max_ns);
    println!("  Std deviation: {:.1} ns", summary.stddev_ns);
}
