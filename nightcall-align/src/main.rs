//! PPS/WAV alignment analysis CLI
//!
//! Point it at a recordings directory for a batch report, or at a single
//! artifact for one segment's alignment. Single-file mode requires the
//! sibling metadata record with the same stem.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use nightcall_align::{batch, report};

#[derive(Parser, Debug)]
#[command(
    name = "nightcall-align",
    version,
    about = "Analyze PPS-to-sample alignment of recorded segments"
)]
struct Args {
    /// Recordings directory, or a single .wav artifact
    path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();

    if args.path.is_dir() {
        let reports = batch::analyze_dir(&args.path)
            .with_context(|| format!("cannot read {}", args.path.display()))?;
        if reports.is_empty() {
            bail!("no analyzable segments in {}", args.path.display());
        }
        for file_report in &reports {
            report::print_file_report(file_report);
        }
        if let Some(summary) = batch::summarize_reports(&reports) {
            report::print_summary(&summary);
        }
    } else if args.path.is_file() {
        let is_wav = args
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if !is_wav {
            bail!("expected a .wav artifact: {}", args.path.display());
        }
        let file_report = batch::analyze_file(&args.path)
            .with_context(|| format!("cannot analyze {}", args.path.display()))?;
        report::print_file_report(&file_report);
    } else {
        bail!("no such path: {}", args.path.display());
    }

    Ok(())
}
