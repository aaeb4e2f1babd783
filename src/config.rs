//! Controller configuration, loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::constants::{self, pins};

/// Safety thresholds used by the detectors and the rerack controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyThresholds {
    /// A drop inside this window counts as a fall
    pub fall_window_ms: u64,
    /// Number of distinct height samples the fall window retains
    pub fall_samples: usize,
    /// Minimum drop (ring steps) across the window
    pub fall_drop: i32,
    /// Struggling when a rep takes longer than this multiple of the first rep
    pub struggle_multiplier: u32,
    /// Continuous help-button hold that requests help on its own
    pub help_hold_ms: u64,
    /// Height estimate at session start
    pub reference_height: i32,
    /// Height at which the rerack motor stops
    pub rerack_target: i32,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            fall_window_ms: constants::FALL_WINDOW_MS,
            fall_samples: constants::FALL_SAMPLE_COUNT,
            fall_drop: constants::FALL_MIN_DROP,
            struggle_multiplier: constants::STRUGGLE_MULTIPLIER,
            help_hold_ms: constants::HELP_HOLD_MS,
            reference_height: constants::REFERENCE_HEIGHT,
            rerack_target: constants::RERACK_TARGET_HEIGHT,
        }
    }
}

impl SafetyThresholds {
    pub fn fall_window(&self) -> Duration {
        Duration::from_millis(self.fall_window_ms)
    }

    pub fn help_hold(&self) -> Duration {
        Duration::from_millis(self.help_hold_ms)
    }
}

/// Loop cadences and fail-safe limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub idle_poll_ms: u64,
    pub tick_interval_ms: u64,
    pub height_sample_us: u64,
    pub pivot_timeout_ms: u64,
    pub rerack_poll_ms: u64,
    pub rerack_max_ms: u64,
    pub rerack_stall_ms: u64,
    pub lift_poll_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            idle_poll_ms: constants::IDLE_POLL_MS,
            tick_interval_ms: constants::TICK_INTERVAL_MS,
            height_sample_us: constants::HEIGHT_SAMPLE_US,
            pivot_timeout_ms: constants::PIVOT_TIMEOUT_MS,
            rerack_poll_ms: constants::RERACK_POLL_MS,
            rerack_max_ms: constants::RERACK_MAX_MS,
            rerack_stall_ms: constants::RERACK_STALL_MS,
            lift_poll_ms: constants::LIFT_POLL_MS,
        }
    }
}

impl Timing {
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn height_sample(&self) -> Duration {
        Duration::from_micros(self.height_sample_us)
    }

    pub fn pivot_timeout(&self) -> Duration {
        Duration::from_millis(self.pivot_timeout_ms)
    }

    pub fn rerack_poll(&self) -> Duration {
        Duration::from_millis(self.rerack_poll_ms)
    }

    pub fn rerack_max(&self) -> Duration {
        Duration::from_millis(self.rerack_max_ms)
    }

    pub fn rerack_stall(&self) -> Duration {
        Duration::from_millis(self.rerack_stall_ms)
    }

    pub fn lift_poll(&self) -> Duration {
        Duration::from_millis(self.lift_poll_ms)
    }
}

/// BCM pin assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub rack: u32,
    /// Invert the rack line. By default the line reads low once the bar
    /// leaves the hooks.
    pub rack_invert: bool,
    pub help: u32,
    pub ring: [u32; constants::RING_SIZE],
    pub motor: u32,
    pub led_red: u32,
    pub led_blue: u32,
    pub led_green: u32,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            rack: pins::RACK,
            rack_invert: false,
            help: pins::HELP,
            ring: pins::RING,
            motor: pins::MOTOR,
            led_red: pins::LED_RED,
            led_blue: pins::LED_BLUE,
            led_green: pins::LED_GREEN,
        }
    }
}

/// Where session journals are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub dir: PathBuf,
    pub stem: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            stem: "set".to_string(),
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotterConfig {
    pub thresholds: SafetyThresholds,
    pub timing: Timing,
    pub pins: PinMap,
    pub journal: JournalConfig,
}

impl SpotterConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: SpotterConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Reject values the controller cannot operate safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if t.fall_window_ms == 0 {
            return Err(ConfigError::Invalid("fall_window_ms must be > 0".into()));
        }
        if t.fall_samples < 2 {
            return Err(ConfigError::Invalid("fall_samples must be >= 2".into()));
        }
        if t.fall_drop <= 0 {
            return Err(ConfigError::Invalid("fall_drop must be > 0".into()));
        }
        if t.struggle_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "struggle_multiplier must be > 0".into(),
            ));
        }
        if t.rerack_target > t.reference_height {
            return Err(ConfigError::Invalid(format!(
                "rerack_target ({}) above reference_height ({})",
                t.rerack_target, t.reference_height
            )));
        }
        let timing = &self.timing;
        let cadences = [
            ("idle_poll_ms", timing.idle_poll_ms),
            ("tick_interval_ms", timing.tick_interval_ms),
            ("height_sample_us", timing.height_sample_us),
            ("rerack_poll_ms", timing.rerack_poll_ms),
            ("lift_poll_ms", timing.lift_poll_ms),
            ("rerack_max_ms", timing.rerack_max_ms),
        ];
        if let Some((name, _)) = cadences.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be > 0")));
        }
        if self.journal.stem.is_empty() {
            return Err(ConfigError::Invalid("journal stem must not be empty".into()));
        }
        Ok(())
    }
}
