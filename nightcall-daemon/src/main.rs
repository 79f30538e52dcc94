//! Nightcall daemon - PPS-disciplined nightly audio recorder
//!
//! Runs unattended on a field device. Waits for clock sync, aligns its
//! cadence to a PPS edge and the next full UTC minute, then records
//! fixed-duration segments inside the configured night window, writing one
//! WAV artifact and one metadata record per segment. SIGINT/SIGTERM stop
//! the loop within a second, killing any in-flight capture.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use nightcall_capture::{Arecord, SegmentRecorder, ShutdownToken};
use nightcall_daemon::clock::ZonedClock;
use nightcall_daemon::config::DaemonConfig;
use nightcall_daemon::scheduler::{Scheduler, SchedulerConfig};
use nightcall_pps::{ChronySync, PpsDevice};

#[derive(Parser, Debug)]
#[command(
    name = "nightcall-daemon",
    version,
    about = "PPS-disciplined nightly audio recorder"
)]
struct Args {
    /// Alternate configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Record one segment immediately and exit, ignoring the night window
    #[arg(long)]
    once: bool,

    /// Override the configured segment duration in seconds (requires --once)
    #[arg(long)]
    duration_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();

    info!(
        "🌙 nightcall daemon v{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("TARGET"),
        env!("BUILD_TIMESTAMP")
    );

    let mut config = DaemonConfig::load(args.config).context("Failed to load configuration")?;
    info!("configuration loaded from {}", config.config_path.display());

    if let Some(secs) = args.duration_secs {
        if !args.once {
            bail!("--duration-secs requires --once");
        }
        config.segment_secs = secs;
    }

    // Configuration errors are fatal before anything starts.
    let tz = config.tz().context("Invalid timezone")?;
    let window = config.window().context("Invalid recording window")?;
    let capture_spec = config.capture_spec().context("Invalid capture configuration")?;
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Cannot create output directory {}",
            config.output_dir.display()
        )
    })?;
    let pps = PpsDevice::new(&config.pps_device).context("PPS device unavailable")?;

    info!(
        "window {}-{} {}, segments {} s + {} s gap, output {}",
        config.window_start,
        config.window_end,
        config.timezone,
        config.segment_secs,
        config.pause_secs,
        config.output_dir.display()
    );

    let token = ShutdownToken::new();
    tokio::spawn(watch_signals(token.clone()));

    let scheduler_config = SchedulerConfig {
        window,
        pause: config.pause(),
        sync_timeout: config.sync_timeout(),
        align_timeout: config.align_timeout(),
        start_timeout: config.start_timeout(),
    };
    let output_dir = config.output_dir.clone();
    let once = args.once;
    let run_token = token.clone();

    // The scheduler blocks on child processes and device polls; keep it off
    // the async runtime.
    let result = tokio::task::spawn_blocking(move || -> Result<()> {
        let sync = ChronySync::new();
        let tool = Arecord;
        let clock = ZonedClock::new(tz);
        let recorder = SegmentRecorder::new(&tool, capture_spec, output_dir);
        let scheduler = Scheduler::new(&pps, &sync, recorder, &clock, scheduler_config, run_token);

        if once {
            let metadata = scheduler.run_once()?;
            info!("wrote {}", metadata.file);
            Ok(())
        } else {
            scheduler.run()
        }
    })
    .await
    .context("Scheduler thread panicked")?;
    result?;

    info!("👋 nightcall daemon stopped");
    Ok(())
}

/// Settle the shutdown token on SIGINT or SIGTERM.
async fn watch_signals(token: ShutdownToken) {
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!("SIGTERM handler unavailable: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
    info!("🛑 shutdown signal received");
    token.cancel();
}
