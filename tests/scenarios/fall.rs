//! Fall detection, lift confirmation and motorised rerack

use super::helpers::*;
use serial_test::serial;
use spotter::hardware::SimulatedRack;
use spotter::indicator::{IndicatorPattern, RecordingIndicator};
use spotter::journal::JournalEntry;
use spotter::models::SessionEnding;
use std::sync::Arc;
use std::thread;

#[test]
#[serial]
fn test_fall_waits_for_lift_then_reracks() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    // Monitors record the starting height, then the bar drops 4 steps fast.
    thread::sleep(ms(50));
    for _ in 0..4 {
        rack.step_down();
        thread::sleep(ms(20));
    }
    assert!(journal.wait_for(&JournalEntry::BarbellFallen, ms(2000)));

    // Bar still pinned: the motor must stay off.
    thread::sleep(ms(150));
    assert_eq!(rack.motor_activations(), 0);
    assert!(!journal.contains(&JournalEntry::BarbellLifted));
    assert_eq!(indicator.last(), Some(IndicatorPattern::RerackWait));

    let lift = MotorLift::start(&rack);
    rack.step_up();
    let outcome = session.join().unwrap().unwrap();
    lift.stop();

    assert_eq!(outcome.ending, SessionEnding::FallRecovered);
    assert!(outcome.final_height >= 48);
    assert!(outcome.used_motor());
    assert_eq!(rack.motor_activations(), 1);
    assert!(!rack.motor_running());
    assert_eq!(
        journal.entries(),
        vec![
            JournalEntry::SetStart,
            JournalEntry::BarbellFallen,
            JournalEntry::BarbellLifted,
            JournalEntry::RerackedSafely,
            JournalEntry::SetEnd,
        ]
    );

    let patterns = indicator.patterns();
    let wait = patterns
        .iter()
        .position(|p| *p == IndicatorPattern::RerackWait)
        .unwrap();
    let rerack = patterns
        .iter()
        .position(|p| *p == IndicatorPattern::Reracking)
        .unwrap();
    assert!(wait < rerack);
    assert_eq!(patterns.last(), Some(&IndicatorPattern::Idle));
}

#[test]
#[serial]
fn test_motor_only_runs_after_lift_confirmed() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    thread::sleep(ms(50));
    for _ in 0..4 {
        rack.step_down();
        thread::sleep(ms(20));
    }
    assert!(journal.wait_for(&JournalEntry::BarbellFallen, ms(2000)));
    thread::sleep(ms(100));

    let lift = MotorLift::start(&rack);
    rack.step_up();
    session.join().unwrap().unwrap();
    lift.stop();

    let lifted_at = journal.recorded_at(&JournalEntry::BarbellLifted).unwrap();
    let writes = rack.motor_writes();
    let (first_on, _) = writes.iter().find(|(_, on)| *on).unwrap();
    assert!(*first_on >= lifted_at);
    assert_eq!(writes.last().map(|(_, on)| *on), Some(false));
}

#[test]
#[serial]
fn test_help_while_pinned_starts_rerack() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    thread::sleep(ms(50));
    for _ in 0..4 {
        rack.step_down();
        thread::sleep(ms(20));
    }
    assert!(journal.wait_for(&JournalEntry::BarbellFallen, ms(2000)));

    let lift = MotorLift::start(&rack);
    rack.set_help(true);
    let outcome = session.join().unwrap().unwrap();
    lift.stop();

    assert_eq!(outcome.ending, SessionEnding::FallRecovered);
    assert!(outcome.final_height >= 48);
    assert_eq!(
        journal.entries(),
        vec![
            JournalEntry::SetStart,
            JournalEntry::BarbellFallen,
            JournalEntry::HelpButtonPressed,
            JournalEntry::RerackedSafely,
            JournalEntry::SetEnd,
        ]
    );
    assert!(indicator.patterns().contains(&IndicatorPattern::HelpSignal));
}

#[test]
#[serial]
fn test_slow_descent_is_not_a_fall() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    thread::sleep(ms(50));
    for _ in 0..4 {
        rack.step_down();
        thread::sleep(ms(200));
    }
    rack.set_rack_seated(true);
    let outcome = session.join().unwrap().unwrap();

    assert_eq!(outcome.ending, SessionEnding::ManuallyReracked);
    assert!(!journal.contains(&JournalEntry::BarbellFallen));
    assert_eq!(rack.motor_activations(), 0);
}
