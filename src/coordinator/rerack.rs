//! Motorised rerack with stall avoidance and a hard time limit

use std::thread;
use std::time::{Duration, Instant};

use crate::config::SpotterConfig;
use crate::error::RerackError;
use crate::hardware::RackIo;
use crate::indicator::{IndicatorPattern, StatusIndicator};
use crate::session::SharedHeight;

/// Why the motor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerackStop {
    /// Height estimate reached the rerack target
    TargetReached,
    /// Rack sensor reports the bar seated
    RackSeated,
}

/// Summary of a successful rerack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RerackReport {
    pub stop: RerackStop,
    pub final_height: i32,
    /// Time the motor spent energised
    pub motor_time: Duration,
}

/// Drives the motor until the bar is back at rack height.
///
/// # Invariants
///
/// - The motor is on only while `height < target` and the rack is not seated
/// - Every return path leaves the motor off
/// - The motor never stays on longer than `stall_after` without the bar moving
/// - The motor never stays on longer than `max_duration` in total
pub struct RerackController<'a> {
    io: &'a dyn RackIo,
    indicator: &'a dyn StatusIndicator,
    target: i32,
    poll: Duration,
    max_duration: Duration,
    stall_after: Duration,
}

impl<'a> RerackController<'a> {
    pub fn new(
        io: &'a dyn RackIo,
        indicator: &'a dyn StatusIndicator,
        config: &SpotterConfig,
    ) -> Self {
        Self {
            io,
            indicator,
            target: config.thresholds.rerack_target,
            poll: config.timing.rerack_poll(),
            max_duration: config.timing.rerack_max(),
            stall_after: config.timing.rerack_stall(),
        }
    }

    pub fn run(&self, height: &SharedHeight) -> Result<RerackReport, RerackError> {
        let started = Instant::now();
        let mut energised_at: Option<Instant> = None;
        let mut last_height = height.get();
        let mut last_move = started;

        loop {
            let current = height.get();
            let seated = match self.io.rack_seated() {
                Ok(seated) => seated,
                Err(e) => {
                    self.halt();
                    return Err(e.into());
                }
            };

            if current >= self.target || seated {
                self.io.set_motor(false)?;
                let stop = if seated {
                    RerackStop::RackSeated
                } else {
                    RerackStop::TargetReached
                };
                let motor_time = energised_at.map(|at| at.elapsed()).unwrap_or_default();
                tracing::info!(?stop, height = current, ?motor_time, "rerack complete");
                return Ok(RerackReport {
                    stop,
                    final_height: current,
                    motor_time,
                });
            }

            let now = Instant::now();
            let elapsed = now.saturating_duration_since(started);
            if elapsed >= self.max_duration {
                self.halt();
                self.indicator.show(IndicatorPattern::Alarm);
                tracing::error!(?elapsed, height = current, "rerack runaway, motor cut");
                return Err(RerackError::Runaway { elapsed });
            }

            if current != last_height {
                last_height = current;
                last_move = now;
            } else if energised_at.is_some()
                && now.saturating_duration_since(last_move) >= self.stall_after
            {
                self.halt();
                self.indicator.show(IndicatorPattern::HelpSignal);
                let still = now.saturating_duration_since(last_move);
                tracing::error!(height = current, ?still, "bar not moving, motor cut");
                return Err(RerackError::Stalled {
                    elapsed: still,
                    height: current,
                });
            }

            if energised_at.is_none() {
                if let Err(e) = self.io.set_motor(true) {
                    self.halt();
                    return Err(e.into());
                }
                energised_at = Some(now);
                last_move = now;
                tracing::debug!(height = current, target = self.target, "motor on");
            }

            thread::sleep(self.poll);
        }
    }

    /// Best-effort motor stop for error paths.
    fn halt(&self) {
        if let Err(e) = self.io.set_motor(false) {
            tracing::error!(error = %e, "failed to stop rerack motor");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::SimulatedRack;
    use crate::indicator::RecordingIndicator;
    use std::sync::Arc;

    fn config(max_ms: u64, stall_ms: u64) -> SpotterConfig {
        let mut config = SpotterConfig::default();
        config.timing.rerack_poll_ms = 1;
        config.timing.rerack_max_ms = max_ms;
        config.timing.rerack_stall_ms = stall_ms;
        config
    }

    #[test]
    fn test_already_at_target_never_energises() {
        let rack = SimulatedRack::new();
        let indicator = RecordingIndicator::new();
        let config = config(1000, 500);
        let height = SharedHeight::new(48);

        let report = RerackController::new(&rack, &indicator, &config)
            .run(&height)
            .unwrap();
        assert_eq!(report.stop, RerackStop::TargetReached);
        assert_eq!(rack.motor_activations(), 0);
        assert!(!rack.motor_running());
    }

    #[test]
    fn test_already_seated_never_energises() {
        let rack = SimulatedRack::new();
        rack.set_rack_seated(true);
        let indicator = RecordingIndicator::new();
        let config = config(1000, 500);

        let report = RerackController::new(&rack, &indicator, &config)
            .run(&SharedHeight::new(30))
            .unwrap();
        assert_eq!(report.stop, RerackStop::RackSeated);
        assert_eq!(rack.motor_activations(), 0);
    }

    #[test]
    fn test_runs_until_target_height() {
        let rack = Arc::new(SimulatedRack::new());
        let indicator = RecordingIndicator::new();
        let config = config(2000, 500);
        let height = SharedHeight::new(44);

        let lift = {
            let rack = rack.clone();
            let height = height.clone();
            thread::spawn(move || {
                while height.get() < 48 {
                    if rack.motor_running() {
                        height.apply(1);
                    }
                    thread::sleep(Duration::from_millis(5));
                }
            })
        };

        let report = RerackController::new(rack.as_ref(), &indicator, &config)
            .run(&height)
            .unwrap();
        lift.join().unwrap();

        assert_eq!(report.stop, RerackStop::TargetReached);
        assert!(report.final_height >= 48);
        assert_eq!(rack.motor_activations(), 1);
        assert!(!rack.motor_running());
    }

    #[test]
    fn test_stops_when_rack_seats_before_target() {
        let rack = Arc::new(SimulatedRack::new());
        let indicator = RecordingIndicator::new();
        let config = config(2000, 500);
        let height = SharedHeight::new(44);

        let seat = {
            let rack = rack.clone();
            let height = height.clone();
            thread::spawn(move || {
                while !rack.motor_running() {
                    thread::sleep(Duration::from_millis(1));
                }
                height.apply(1);
                thread::sleep(Duration::from_millis(20));
                rack.set_rack_seated(true);
            })
        };

        let report = RerackController::new(rack.as_ref(), &indicator, &config)
            .run(&height)
            .unwrap();
        seat.join().unwrap();

        assert_eq!(report.stop, RerackStop::RackSeated);
        assert!(report.final_height < 48);
        assert!(!rack.motor_running());
    }

    #[test]
    fn test_stall_cuts_motor_and_signals_help() {
        let rack = SimulatedRack::new();
        let indicator = RecordingIndicator::new();
        let config = config(5000, 30);

        let err = RerackController::new(&rack, &indicator, &config)
            .run(&SharedHeight::new(40))
            .unwrap_err();

        assert!(matches!(err, RerackError::Stalled { height: 40, .. }));
        assert!(err.is_safety_fault());
        assert!(!rack.motor_running());
        assert_eq!(indicator.last(), Some(IndicatorPattern::HelpSignal));
    }

    #[test]
    fn test_runaway_cuts_motor_and_alarms() {
        let rack = Arc::new(SimulatedRack::new());
        let indicator = RecordingIndicator::new();
        let config = config(60, 1000);
        let height = SharedHeight::new(20);

        // Keeps moving, never gets anywhere near the target.
        let creep = {
            let height = height.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    height.apply(1);
                    thread::sleep(Duration::from_millis(5));
                }
            })
        };

        let err = RerackController::new(rack.as_ref(), &indicator, &config)
            .run(&height)
            .unwrap_err();
        creep.join().unwrap();

        assert!(matches!(err, RerackError::Runaway { .. }));
        assert!(!rack.motor_running());
        assert_eq!(indicator.last(), Some(IndicatorPattern::Alarm));
    }

    #[test]
    fn test_sensor_fault_stops_motor() {
        let rack = SimulatedRack::new();
        rack.set_faulted(true);
        let indicator = RecordingIndicator::new();
        let config = config(1000, 500);

        let err = RerackController::new(&rack, &indicator, &config)
            .run(&SharedHeight::new(40))
            .unwrap_err();
        assert!(matches!(err, RerackError::Hardware(_)));
        assert!(!rack.motor_running());
    }
}
