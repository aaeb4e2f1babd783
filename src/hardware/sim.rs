//! In-memory rack for tests and bench runs
//!
//! Tracks sensor levels and actuator writes so tests can script a set
//! (bar moving around the ring, button presses, rack re-seating) and then
//! verify what the controller did with the motor and LEDs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::error::HardwareError;
use crate::models::constants::RING_SIZE;

use super::{Led, RackIo};

#[derive(Debug)]
struct SimState {
    rack_seated: bool,
    help: bool,
    ring: [bool; RING_SIZE],
    /// Ring sensor currently under the bar, if any
    position: Option<usize>,
    motor: bool,
    motor_writes: Vec<(Instant, bool)>,
    leds: HashMap<Led, bool>,
    faulted: bool,
}

/// Simulated rack hardware.
#[derive(Debug)]
pub struct SimulatedRack {
    state: Mutex<SimState>,
}

impl Default for SimulatedRack {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRack {
    /// Bar off the rack, ring sensor 0 under the bar, everything else idle.
    pub fn new() -> Self {
        let mut ring = [false; RING_SIZE];
        ring[0] = true;
        Self {
            state: Mutex::new(SimState {
                rack_seated: false,
                help: false,
                ring,
                position: Some(0),
                motor: false,
                motor_writes: Vec::new(),
                leds: HashMap::new(),
                faulted: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_rack_seated(&self, seated: bool) {
        self.lock().rack_seated = seated;
    }

    pub fn set_help(&self, pressed: bool) {
        self.lock().help = pressed;
    }

    /// Move the bar one sensor clockwise (one step up).
    pub fn step_up(&self) {
        self.step(1);
    }

    /// Move the bar one sensor counter-clockwise (one step down).
    pub fn step_down(&self) {
        self.step(RING_SIZE - 1);
    }

    fn step(&self, offset: usize) {
        let mut state = self.lock();
        let next = (state.position.unwrap_or(0) + offset) % RING_SIZE;
        state.ring = [false; RING_SIZE];
        state.ring[next] = true;
        state.position = Some(next);
    }

    /// Put the bar between sensors so none reads active.
    pub fn clear_ring(&self) {
        let mut state = self.lock();
        state.ring = [false; RING_SIZE];
        state.position = None;
    }

    /// Set raw ring levels (several sensors may be active at once).
    pub fn set_ring(&self, levels: [bool; RING_SIZE]) {
        let mut state = self.lock();
        state.ring = levels;
        state.position = levels.iter().rposition(|&active| active);
    }

    /// Make every subsequent read fail.
    pub fn set_faulted(&self, faulted: bool) {
        self.lock().faulted = faulted;
    }

    pub fn motor_running(&self) -> bool {
        self.lock().motor
    }

    /// Every motor write in order, with the time it happened.
    pub fn motor_writes(&self) -> Vec<(Instant, bool)> {
        self.lock().motor_writes.clone()
    }

    /// Number of off -> on motor transitions.
    pub fn motor_activations(&self) -> usize {
        let state = self.lock();
        let mut running = false;
        let mut count = 0;
        for &(_, on) in &state.motor_writes {
            if on && !running {
                count += 1;
            }
            running = on;
        }
        count
    }

    pub fn led(&self, led: Led) -> bool {
        self.lock().leds.get(&led).copied().unwrap_or(false)
    }

    fn check_fault(state: &SimState) -> Result<(), HardwareError> {
        if state.faulted {
            return Err(HardwareError::Io {
                pin: 0,
                source: std::io::Error::other("simulated fault"),
            });
        }
        Ok(())
    }
}

impl RackIo for SimulatedRack {
    fn rack_seated(&self) -> Result<bool, HardwareError> {
        let state = self.lock();
        Self::check_fault(&state)?;
        Ok(state.rack_seated)
    }

    fn help_pressed(&self) -> Result<bool, HardwareError> {
        let state = self.lock();
        Self::check_fault(&state)?;
        Ok(state.help)
    }

    fn ring_active(&self, index: usize) -> Result<bool, HardwareError> {
        let state = self.lock();
        Self::check_fault(&state)?;
        state
            .ring
            .get(index)
            .copied()
            .ok_or(HardwareError::RingIndex(index))
    }

    fn ring_snapshot(&self) -> Result<[bool; RING_SIZE], HardwareError> {
        let state = self.lock();
        Self::check_fault(&state)?;
        Ok(state.ring)
    }

    fn set_motor(&self, running: bool) -> Result<(), HardwareError> {
        let mut state = self.lock();
        state.motor = running;
        state.motor_writes.push((Instant::now(), running));
        Ok(())
    }

    fn set_led(&self, led: Led, on: bool) -> Result<(), HardwareError> {
        self.lock().leds.insert(led, on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_wrap_around_the_ring() {
        let rack = SimulatedRack::new();
        assert_eq!(rack.ring_snapshot().unwrap(), [true, false, false, false]);

        rack.step_down();
        assert_eq!(rack.ring_snapshot().unwrap(), [false, false, false, true]);

        rack.step_up();
        rack.step_up();
        assert_eq!(rack.ring_snapshot().unwrap(), [false, true, false, false]);
    }

    #[test]
    fn test_motor_activations_count_rising_edges() {
        let rack = SimulatedRack::new();
        rack.set_motor(false).unwrap();
        rack.set_motor(true).unwrap();
        rack.set_motor(true).unwrap();
        rack.set_motor(false).unwrap();
        rack.set_motor(true).unwrap();
        assert_eq!(rack.motor_activations(), 2);
        assert!(rack.motor_running());
    }

    #[test]
    fn test_fault_fails_reads_but_not_motor_stop() {
        let rack = SimulatedRack::new();
        rack.set_faulted(true);
        assert!(rack.help_pressed().is_err());
        assert!(rack.set_motor(false).is_ok());
    }
}
