//! Hardware capability for the rack
//!
//! Every component receives the rack's pins through [`RackIo`] instead of
//! touching globals, so sessions can run against real GPIO or a simulator.
//! All values are logical: polarity inversion is handled by the backend.

mod sim;
mod sysfs;

pub use sim::SimulatedRack;
pub use sysfs::SysfsRack;

use crate::error::HardwareError;
use crate::models::constants::RING_SIZE;

/// Status LEDs on the rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Led {
    Red,
    Blue,
    Green,
}

/// Logical pin access shared by the monitors, the coordinator and the
/// rerack controller.
///
/// # Invariants
///
/// - Reads never block
/// - `set_motor(false)` must succeed whenever possible; callers use it to
///   reach the safe state on every error path
pub trait RackIo: Send + Sync {
    /// Bar is resting on the rack hooks
    fn rack_seated(&self) -> Result<bool, HardwareError>;

    /// Help button is held down
    fn help_pressed(&self) -> Result<bool, HardwareError>;

    /// Ring sensor `index` (0..RING_SIZE) is triggered
    fn ring_active(&self, index: usize) -> Result<bool, HardwareError>;

    /// Drive the rerack motor enable line
    fn set_motor(&self, running: bool) -> Result<(), HardwareError>;

    /// Drive a status LED
    fn set_led(&self, led: Led, on: bool) -> Result<(), HardwareError>;

    /// Read every ring sensor in traversal order
    fn ring_snapshot(&self) -> Result<[bool; RING_SIZE], HardwareError> {
        let mut levels = [false; RING_SIZE];
        for (index, level) in levels.iter_mut().enumerate() {
            *level = self.ring_active(index)?;
        }
        Ok(levels)
    }
}
