//! Manual rerack by the lifter

use super::helpers::*;
use serial_test::serial;
use spotter::hardware::SimulatedRack;
use spotter::indicator::RecordingIndicator;
use spotter::journal::JournalEntry;
use spotter::models::SessionEnding;
use std::sync::Arc;
use std::thread;

#[test]
#[serial]
fn test_manual_rerack_never_runs_motor() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    // A couple of reps, then the bar goes back on the hooks.
    thread::sleep(ms(50));
    for _ in 0..2 {
        rack.step_up();
        thread::sleep(ms(40));
        rack.step_down();
        thread::sleep(ms(40));
    }
    rack.set_rack_seated(true);
    let outcome = session.join().unwrap().unwrap();

    assert_eq!(outcome.ending, SessionEnding::ManuallyReracked);
    assert_eq!(outcome.reps, 2);
    assert_eq!(outcome.motor_time, std::time::Duration::ZERO);
    assert_eq!(rack.motor_activations(), 0);
    assert!(rack.motor_writes().is_empty());
    assert_eq!(
        journal.entries(),
        vec![
            JournalEntry::SetStart,
            JournalEntry::RepFinished(1),
            JournalEntry::RepFinished(2),
            JournalEntry::BarbellReracked,
            JournalEntry::SetEnd,
        ]
    );
}

#[test]
#[serial]
fn test_sensor_fault_mid_set_keeps_session_alive() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    thread::sleep(ms(50));
    rack.set_faulted(true);
    thread::sleep(ms(100));
    rack.set_faulted(false);
    rack.set_rack_seated(true);

    let outcome = session.join().unwrap().unwrap();
    assert_eq!(outcome.ending, SessionEnding::ManuallyReracked);
    assert_eq!(rack.motor_activations(), 0);
}
