//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use nightcall_capture::{pcm_format, CaptureSpec};

use crate::window::RecordingWindow;

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Path the configuration was loaded from
    #[serde(skip)]
    pub config_path: PathBuf,

    /// PPS device path or name (e.g. "/dev/pps0")
    pub pps_device: String,

    /// ALSA capture device (check with `arecord -l`)
    pub audio_device: String,

    /// Capture sample rate in Hz
    pub sample_rate_hz: u32,

    /// Sample width in bits (16, 24 or 32)
    pub bits: u16,

    /// Channel count
    pub channels: u16,

    /// Fixed segment duration in seconds
    pub segment_secs: u64,

    /// Pause between segments in seconds
    pub pause_secs: u64,

    /// Night window start, local time ("HH:MM")
    pub window_start: String,

    /// Night window end, local time ("HH:MM"); may be before the start,
    /// wrapping midnight
    pub window_end: String,

    /// IANA timezone the window is evaluated in
    pub timezone: String,

    /// Directory for audio artifacts and metadata records
    pub output_dir: PathBuf,

    /// How long to wait for the clock-sync daemon at startup (seconds)
    pub sync_timeout_secs: u64,

    /// PPS wait bound for the initial cadence alignment (seconds)
    pub pps_align_timeout_secs: u64,

    /// PPS wait bound immediately before each segment (seconds)
    pub pps_start_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            pps_device: "/dev/pps0".to_string(),
            audio_device: "hw:1,0".to_string(),
            sample_rate_hz: 48000,
            bits: 16,
            channels: 1,
            segment_secs: 59 * 60 + 55,
            pause_secs: 5,
            window_start: "22:00".to_string(),
            window_end: "06:00".to_string(),
            timezone: "America/New_York".to_string(),
            output_dir: PathBuf::from("/data/nfc"),
            sync_timeout_secs: 120,
            pps_align_timeout_secs: 10,
            pps_start_timeout_secs: 5,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from `path` (or the default location), creating a
    /// default file on first run.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let mut config: DaemonConfig =
                toml::from_str(&contents).context("Failed to parse config file")?;

            config.config_path = config_path;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.save().context("Failed to save default config")?;
            Ok(config)
        }
    }

    /// Save configuration to its file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nightcall")
            .join("config.toml")
    }

    /// The configured night window. Malformed bounds are fatal.
    pub fn window(&self) -> Result<RecordingWindow> {
        RecordingWindow::parse(&self.window_start, &self.window_end)
    }

    /// The configured timezone. Unknown identifiers are fatal.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("unknown timezone {:?}: {e}", self.timezone))
    }

    /// Capture parameters, validated. Unsupported widths and zero rates or
    /// durations are fatal configuration errors.
    pub fn capture_spec(&self) -> Result<CaptureSpec> {
        pcm_format(self.bits)?;
        if self.sample_rate_hz == 0 {
            bail!("sample_rate_hz must be positive");
        }
        if self.channels == 0 {
            bail!("channels must be positive");
        }
        if self.segment_secs == 0 {
            bail!("segment_secs must be positive");
        }

        Ok(CaptureSpec {
            device: self.audio_device.clone(),
            sample_rate_hz: self.sample_rate_hz,
            bits: self.bits,
            channels: self.channels,
            duration_secs: self.segment_secs,
        })
    }

    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    pub fn align_timeout(&self) -> Duration {
        Duration::from_secs(self.pps_align_timeout_secs)
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.pps_start_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DaemonConfig::default();
        assert!(config.window().is_ok());
        assert!(config.tz().is_ok());
        assert!(config.capture_spec().is_ok());
    }

    #[test]
    fn first_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = DaemonConfig::load(Some(path.clone())).unwrap();
        assert!(path.exists(), "default config should be written");
        assert_eq!(config.sample_rate_hz, 48000);

        // A second load reads the file back identically.
        let again = DaemonConfig::load(Some(path)).unwrap();
        assert_eq!(again.segment_secs, config.segment_secs);
        assert_eq!(again.timezone, config.timezone);
    }

    #[test]
    fn save_and_reload_round_trips_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = DaemonConfig::load(Some(path.clone())).unwrap();
        config.segment_secs = 30;
        config.window_start = "20:30".to_string();
        config.save().unwrap();

        let reloaded = DaemonConfig::load(Some(path)).unwrap();
        assert_eq!(reloaded.segment_secs, 30);
        assert_eq!(reloaded.window_start, "20:30");
    }

    #[test]
    fn unknown_timezone_is_fatal() {
        let config = DaemonConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..DaemonConfig::default()
        };
        assert!(config.tz().is_err());
    }

    #[test]
    fn unsupported_sample_width_is_fatal() {
        let config = DaemonConfig {
            bits: 12,
            ..DaemonConfig::default()
        };
        assert!(config.capture_spec().is_err());
    }

    #[test]
    fn zero_rate_or_duration_is_fatal() {
        let config = DaemonConfig {
            sample_rate_hz: 0,
            ..DaemonConfig::default()
        };
        assert!(config.capture_spec().is_err());

        let config = DaemonConfig {
            segment_secs: 0,
            ..DaemonConfig::default()
        };
        assert!(config.capture_spec().is_err());
    }
}
