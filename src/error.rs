//! Error types for the spotter controller

use std::path::PathBuf;
use std::time::Duration;

use crate::models::OperationState;

/// Failures talking to the pins.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    #[error("GPIO {pin} I/O failed: {source}")]
    Io {
        pin: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("GPIO {pin} returned unexpected value {value:?}")]
    BadValue { pin: u32, value: String },

    #[error("Ring sensor index {0} out of range")]
    RingIndex(usize),
}

/// Failures of the motorised rerack procedure.
#[derive(Debug, thiserror::Error)]
pub enum RerackError {
    #[error("Motor ran for {elapsed:?} without reaching the rack")]
    Runaway { elapsed: Duration },

    #[error("Bar did not move within {elapsed:?} of energising the motor (height {height})")]
    Stalled { elapsed: Duration, height: i32 },

    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

impl RerackError {
    /// Whether the fault needs a human before the rack can be used again.
    pub fn is_safety_fault(&self) -> bool {
        matches!(self, RerackError::Runaway { .. } | RerackError::Stalled { .. })
    }
}

/// Conditions that end a session early.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Monitor '{monitor}' stopped without reporting an event")]
    MonitorExited { monitor: &'static str },

    #[error("Monitor event stream closed unexpectedly")]
    EventStreamClosed,

    #[error("Invalid operation state transition: {from} -> {to}")]
    InvalidTransition {
        from: OperationState,
        to: OperationState,
    },

    #[error("Rerack failed: {0}")]
    Rerack(#[from] RerackError),

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error("Shutdown requested during session")]
    Shutdown,

    #[error("Failed to spawn {monitor} thread: {source}")]
    Spawn {
        monitor: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the append-only session journal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("Failed to create journal directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No free journal file name for {stem} after {attempts} attempts")]
    Exhausted { stem: String, attempts: u32 },

    #[error("Failed to write journal {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid or unreadable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
