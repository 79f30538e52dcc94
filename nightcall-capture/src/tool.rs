//! External capture tool abstraction
//!
//! The recorder never touches the sound card itself; it launches one
//! fixed-duration capture process per segment. The tool sits behind a
//! start/wait/kill seam so the scheduling logic is independent of the
//! specific ALSA frontend and can run against a deterministic fake in tests.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::{CaptureError, Result};

/// Parameters of one capture invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSpec {
    /// ALSA device identifier, e.g. `hw:1,0`.
    pub device: String,
    pub sample_rate_hz: u32,
    pub bits: u16,
    pub channels: u16,
    pub duration_secs: u64,
}

/// Map a sample width to the ALSA little-endian PCM format name.
///
/// Any width outside the supported set is a configuration error and should
/// be fatal at startup.
pub fn pcm_format(bits: u16) -> Result<&'static str> {
    match bits {
        16 => Ok("S16_LE"),
        24 => Ok("S24_LE"),
        32 => Ok("S32_LE"),
        other => Err(CaptureError::UnsupportedBits(other)),
    }
}

/// Handle on one running capture process.
pub trait CaptureHandle: Send {
    /// Poll for completion without blocking; `Some(rc)` once exited.
    fn try_wait(&mut self) -> Result<Option<i32>>;

    /// Terminate the capture and reap it, returning its exit code.
    fn kill(&mut self) -> Result<i32>;
}

/// Launcher for capture processes.
pub trait CaptureTool {
    fn start(&self, spec: &CaptureSpec, out: &Path) -> Result<Box<dyn CaptureHandle>>;
}

/// Capture via `arecord`.
#[derive(Debug, Default)]
pub struct Arecord;

impl CaptureTool for Arecord {
    fn start(&self, spec: &CaptureSpec, out: &Path) -> Result<Box<dyn CaptureHandle>> {
        let format = pcm_format(spec.bits)?;
        let child = Command::new("arecord")
            .arg("-D")
            .arg(&spec.device)
            .arg("-f")
            .arg(format)
            .arg("-c")
            .arg(spec.channels.to_string())
            .arg("-r")
            .arg(spec.sample_rate_hz.to_string())
            .arg("-d")
            .arg(spec.duration_secs.to_string())
            .arg(out)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| CaptureError::tool(format!("failed to launch arecord: {e}")))?;
        Ok(Box::new(ProcessHandle { child }))
    }
}

struct ProcessHandle {
    child: Child,
}

impl CaptureHandle for ProcessHandle {
    fn try_wait(&mut self) -> Result<Option<i32>> {
        // A capture killed by signal has no exit code; report -1 so the
        // metadata still records a nonzero result.
        Ok(self.child.try_wait()?.map(|s| s.code().unwrap_or(-1)))
    }

    fn kill(&mut self) -> Result<i32> {
        // kill() fails with InvalidInput if the child already exited;
        // wait() below reaps it either way.
        let _ = self.child.kill();
        let status = self.child.wait()?;
        Ok(status.code().unwrap_or(-1))
    }
}
