//! Shared scaffolding for the session scenarios

use spotter::config::SpotterConfig;
use spotter::coordinator::Coordinator;
use spotter::error::{JournalError, SessionError};
use spotter::hardware::SimulatedRack;
use spotter::indicator::RecordingIndicator;
use spotter::journal::{JournalEntry, SessionJournal};
use spotter::models::SessionOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Default safety thresholds with fast loop cadences.
pub fn fast_config() -> SpotterConfig {
    let mut config = SpotterConfig::default();
    config.timing.tick_interval_ms = 1;
    config.timing.height_sample_us = 200;
    config.timing.pivot_timeout_ms = 100;
    config.timing.rerack_poll_ms = 1;
    config.timing.lift_poll_ms = 1;
    config.timing.rerack_max_ms = 3000;
    config.timing.rerack_stall_ms = 500;
    config
}

/// Journal that remembers when each entry was written.
#[derive(Debug, Default, Clone)]
pub struct TimedJournal {
    entries: Arc<Mutex<Vec<(Instant, JournalEntry)>>>,
}

impl TimedJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    pub fn contains(&self, entry: &JournalEntry) -> bool {
        self.entries().contains(entry)
    }

    pub fn count(&self, entry: &JournalEntry) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    /// Time the first matching entry was written.
    pub fn recorded_at(&self, entry: &JournalEntry) -> Option<Instant> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(_, e)| e == entry)
            .map(|(at, _)| *at)
    }

    /// Poll until `entry` shows up or `timeout` passes.
    pub fn wait_for(&self, entry: &JournalEntry, timeout: Duration) -> bool {
        wait_until(timeout, || self.contains(entry))
    }
}

impl SessionJournal for TimedJournal {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        self.entries
            .lock()
            .unwrap()
            .push((Instant::now(), entry.clone()));
        Ok(())
    }
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(ms(2));
    }
    condition()
}

/// Run one session on a background thread.
pub fn start_session(
    rack: &Arc<SimulatedRack>,
    indicator: &RecordingIndicator,
    config: SpotterConfig,
    journal: &TimedJournal,
) -> JoinHandle<Result<SessionOutcome, SessionError>> {
    let mut coordinator = Coordinator::new(rack.clone(), Arc::new(indicator.clone()), config);
    let mut journal = journal.clone();
    thread::spawn(move || coordinator.run_session(&mut journal))
}

/// Stand-in for the rerack mechanism: raises the bar one step every few
/// milliseconds while the motor is energised.
pub struct MotorLift {
    done: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl MotorLift {
    pub fn start(rack: &Arc<SimulatedRack>) -> Self {
        let done = Arc::new(AtomicBool::new(false));
        let handle = {
            let rack = rack.clone();
            let done = done.clone();
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    if rack.motor_running() {
                        rack.step_up();
                    }
                    thread::sleep(ms(5));
                }
            })
        };
        Self { done, handle }
    }

    pub fn stop(self) {
        self.done.store(true, Ordering::Relaxed);
        self.handle.join().unwrap();
    }
}
