//! Height tracking from the sensor ring
//!
//! Four proximity sensors sit at 90° around the bar's path. The sensor the
//! bar last definitely passed is the pivot; seeing the clockwise neighbour
//! fire means the bar rose one step, the counter-clockwise neighbour means
//! it dropped one step.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::SessionError;
use crate::hardware::RackIo;
use crate::models::constants::RING_SIZE;
use crate::session::{CancelFlag, SharedHeight};

use super::{spawn_named, MonitorHandle};

/// Quadrature-style decoder over the sensor ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingDecoder {
    pivot: usize,
}

impl RingDecoder {
    pub fn new(pivot: usize) -> Self {
        Self {
            pivot: pivot % RING_SIZE,
        }
    }

    /// Pick the starting pivot from a ring reading.
    ///
    /// Sensors are visited in order 0..RING_SIZE and the last active one
    /// wins. `None` when no sensor is active.
    pub fn initial_pivot(levels: &[bool; RING_SIZE]) -> Option<usize> {
        levels.iter().rposition(|&active| active)
    }

    pub fn pivot(&self) -> usize {
        self.pivot
    }

    pub fn clockwise(&self) -> usize {
        (self.pivot + 1) % RING_SIZE
    }

    pub fn counter_clockwise(&self) -> usize {
        (self.pivot + RING_SIZE - 1) % RING_SIZE
    }

    /// Decode one ring reading into a height delta and advance the pivot.
    ///
    /// Both neighbours active at once cancels out and leaves the pivot put.
    pub fn step(&mut self, levels: &[bool; RING_SIZE]) -> i32 {
        let ccw = self.counter_clockwise();
        let cw = self.clockwise();
        match (levels[ccw], levels[cw]) {
            (true, false) => {
                self.pivot = ccw;
                -1
            }
            (false, true) => {
                self.pivot = cw;
                1
            }
            _ => 0,
        }
    }
}

/// Sole writer of the session's height estimate.
pub struct HeightTracker {
    io: Arc<dyn RackIo>,
    height: SharedHeight,
    cancel: CancelFlag,
    sample_interval: Duration,
    pivot_timeout: Duration,
}

impl HeightTracker {
    pub fn new(
        io: Arc<dyn RackIo>,
        height: SharedHeight,
        cancel: CancelFlag,
        sample_interval: Duration,
        pivot_timeout: Duration,
    ) -> Self {
        Self {
            io,
            height,
            cancel,
            sample_interval,
            pivot_timeout,
        }
    }

    pub fn spawn(self) -> Result<MonitorHandle, SessionError> {
        spawn_named("height", move || self.run())
    }

    /// Sample the ring until cancelled.
    pub fn run(self) {
        let Some(pivot) = self.establish_pivot() else {
            return;
        };
        let mut decoder = RingDecoder::new(pivot);
        tracing::debug!(pivot, height = self.height.get(), "height tracker started");

        let mut failing = false;
        while !self.cancel.is_cancelled() {
            match self.io.ring_snapshot() {
                Ok(levels) => {
                    failing = false;
                    let delta = decoder.step(&levels);
                    if delta != 0 {
                        let height = self.height.apply(delta);
                        tracing::trace!(height, pivot = decoder.pivot(), "height changed");
                    }
                }
                Err(e) => {
                    if !failing {
                        tracing::warn!(error = %e, "ring read failed");
                        failing = true;
                    }
                }
            }
            thread::sleep(self.sample_interval);
        }
        tracing::trace!("height tracker stopped");
    }

    /// Wait for any ring sensor to read active.
    ///
    /// Falls back to pivot 0 after `pivot_timeout`; the estimate can then be
    /// off by one step until the bar next passes a sensor. Returns `None`
    /// only when cancelled while waiting.
    fn establish_pivot(&self) -> Option<usize> {
        let started = Instant::now();
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            if let Ok(levels) = self.io.ring_snapshot() {
                if let Some(pivot) = RingDecoder::initial_pivot(&levels) {
                    return Some(pivot);
                }
            }
            if started.elapsed() >= self.pivot_timeout {
                tracing::warn!(
                    timeout_ms = self.pivot_timeout.as_millis() as u64,
                    "no ring sensor active, assuming pivot 0"
                );
                return Some(0);
            }
            thread::sleep(self.sample_interval);
        }
    }
}
