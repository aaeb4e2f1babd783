//! Help button: long press and press while struggling

use super::helpers::*;
use serial_test::serial;
use spotter::hardware::SimulatedRack;
use spotter::indicator::{IndicatorPattern, RecordingIndicator};
use spotter::journal::JournalEntry;
use spotter::models::SessionEnding;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[test]
#[serial]
fn test_long_press_requests_help_after_two_seconds() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    thread::sleep(ms(50));
    let pressed_at = Instant::now();
    rack.set_help(true);

    // Release after 2100ms; re-seat later so a missed request cannot hang.
    let script = {
        let rack = rack.clone();
        thread::spawn(move || {
            thread::sleep(ms(2100));
            rack.set_help(false);
            thread::sleep(ms(500));
            rack.set_rack_seated(true);
        })
    };
    let outcome = session.join().unwrap().unwrap();
    script.join().unwrap();

    assert_eq!(outcome.ending, SessionEnding::HelpRecovered);
    assert!(!outcome.struggled);
    assert_eq!(journal.count(&JournalEntry::HelpButtonPressed), 1);

    let held = journal
        .recorded_at(&JournalEntry::HelpButtonPressed)
        .unwrap()
        .duration_since(pressed_at);
    assert!(held >= ms(2000), "help requested after only {held:?}");
    assert!(held < ms(2100), "help requested too late: {held:?}");

    // Bar never left rack height, so no motor was needed.
    assert_eq!(rack.motor_activations(), 0);
    assert!(indicator.patterns().contains(&IndicatorPattern::HelpSignal));
}

#[test]
#[serial]
fn test_short_press_is_ignored() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    thread::sleep(ms(50));
    rack.set_help(true);
    thread::sleep(ms(500));
    rack.set_help(false);
    thread::sleep(ms(2000));
    assert!(!journal.contains(&JournalEntry::HelpButtonPressed));

    rack.set_rack_seated(true);
    let outcome = session.join().unwrap().unwrap();
    assert_eq!(outcome.ending, SessionEnding::ManuallyReracked);
}

#[test]
#[serial]
fn test_press_while_struggling_requests_help_at_once() {
    let rack = Arc::new(SimulatedRack::new());
    let indicator = RecordingIndicator::new();
    let journal = TimedJournal::new();
    let session = start_session(&rack, &indicator, fast_config(), &journal);

    // One quick rep sets a ~100ms baseline.
    thread::sleep(ms(50));
    rack.step_up();
    thread::sleep(ms(50));
    rack.step_down();
    assert!(journal.wait_for(&JournalEntry::RepFinished(1), ms(1000)));

    // The next rep drags on well past twice the baseline.
    thread::sleep(ms(400));
    rack.step_up();
    assert!(journal.wait_for(&JournalEntry::AskedForHelp, ms(1000)));
    assert!(indicator.patterns().contains(&IndicatorPattern::AskUser));

    let pressed_at = Instant::now();
    rack.set_help(true);
    let outcome = session.join().unwrap().unwrap();

    let waited = journal
        .recorded_at(&JournalEntry::HelpButtonPressed)
        .unwrap()
        .duration_since(pressed_at);
    assert!(waited < ms(500), "help took {waited:?}");
    assert_eq!(outcome.ending, SessionEnding::HelpRecovered);
    assert_eq!(outcome.reps, 1);
    assert!(outcome.struggled);
    assert_eq!(journal.count(&JournalEntry::AskedForHelp), 1);
}
