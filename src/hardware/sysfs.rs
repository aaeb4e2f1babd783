//! Linux sysfs GPIO backend

use std::fs;
use std::path::PathBuf;

use crate::config::PinMap;
use crate::error::HardwareError;
use crate::models::constants::RING_SIZE;

use super::{Led, RackIo};

/// Reads and writes `/sys/class/gpio/gpioN/value`.
///
/// Pins must already be exported and configured (direction) by the board
/// bring-up; this backend only touches the value files.
#[derive(Debug, Clone)]
pub struct SysfsRack {
    root: PathBuf,
    pins: PinMap,
}

impl SysfsRack {
    pub fn new(pins: PinMap) -> Self {
        Self::with_root(PathBuf::from("/sys/class/gpio"), pins)
    }

    /// Use a different sysfs root (bench rigs, tests).
    pub fn with_root(root: PathBuf, pins: PinMap) -> Self {
        Self { root, pins }
    }

    fn value_path(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}")).join("value")
    }

    fn read_level(&self, pin: u32) -> Result<bool, HardwareError> {
        let raw = fs::read_to_string(self.value_path(pin))
            .map_err(|source| HardwareError::Io { pin, source })?;
        match raw.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(HardwareError::BadValue {
                pin,
                value: other.to_string(),
            }),
        }
    }

    fn write_level(&self, pin: u32, high: bool) -> Result<(), HardwareError> {
        fs::write(self.value_path(pin), if high { "1" } else { "0" })
            .map_err(|source| HardwareError::Io { pin, source })
    }
}

impl RackIo for SysfsRack {
    fn rack_seated(&self) -> Result<bool, HardwareError> {
        let level = self.read_level(self.pins.rack)?;
        Ok(level != self.pins.rack_invert)
    }

    fn help_pressed(&self) -> Result<bool, HardwareError> {
        self.read_level(self.pins.help)
    }

    fn ring_active(&self, index: usize) -> Result<bool, HardwareError> {
        if index >= RING_SIZE {
            return Err(HardwareError::RingIndex(index));
        }
        self.read_level(self.pins.ring[index])
    }

    fn set_motor(&self, running: bool) -> Result<(), HardwareError> {
        self.write_level(self.pins.motor, running)
    }

    fn set_led(&self, led: Led, on: bool) -> Result<(), HardwareError> {
        let pin = match led {
            Led::Red => self.pins.led_red,
            Led::Blue => self.pins.led_blue,
            Led::Green => self.pins.led_green,
        };
        self.write_level(pin, on)
    }
}
