//! Status indicator for the lifter
//!
//! The controller only says *what* to show; how each pattern is rendered
//! (steady, flashing, strobing) is up to the indicator implementation.

use colored::Colorize;
use std::sync::{Arc, Mutex};

use crate::hardware::{Led, RackIo};

/// What the rack is telling the lifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPattern {
    /// Waiting for a set (green)
    Idle,
    /// Set in progress (blue)
    Monitoring,
    /// Lifter looks like they are struggling; ask whether they need help
    AskUser,
    /// Fall detected, waiting for the lifter to start lifting (red, steady)
    RerackWait,
    /// Motor is reracking the bar (red, flashing)
    Reracking,
    /// Help has been requested (red, strobing 5x at 500ms)
    HelpSignal,
    /// Safety fault; a human must check the rack
    Alarm,
}

impl IndicatorPattern {
    /// Steady LED levels as (red, blue, green).
    pub fn levels(&self) -> (bool, bool, bool) {
        match self {
            IndicatorPattern::Idle => (false, false, true),
            IndicatorPattern::Monitoring => (false, true, false),
            IndicatorPattern::AskUser => (true, true, false),
            IndicatorPattern::RerackWait
            | IndicatorPattern::Reracking
            | IndicatorPattern::HelpSignal
            | IndicatorPattern::Alarm => (true, false, false),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorPattern::Idle => "idle",
            IndicatorPattern::Monitoring => "monitoring",
            IndicatorPattern::AskUser => "need help?",
            IndicatorPattern::RerackWait => "waiting for lift",
            IndicatorPattern::Reracking => "reracking",
            IndicatorPattern::HelpSignal => "help requested",
            IndicatorPattern::Alarm => "ALARM",
        }
    }
}

/// Something that can show an [`IndicatorPattern`].
pub trait StatusIndicator: Send + Sync {
    fn show(&self, pattern: IndicatorPattern);
}

/// Drives the red/blue/green LED lines with steady levels.
pub struct PinIndicator {
    io: Arc<dyn RackIo>,
}

impl PinIndicator {
    pub fn new(io: Arc<dyn RackIo>) -> Self {
        Self { io }
    }
}

impl StatusIndicator for PinIndicator {
    fn show(&self, pattern: IndicatorPattern) {
        let (red, blue, green) = pattern.levels();
        for (led, on) in [(Led::Red, red), (Led::Blue, blue), (Led::Green, green)] {
            if let Err(e) = self.io.set_led(led, on) {
                tracing::warn!(?led, error = %e, "failed to drive status LED");
            }
        }
    }
}

/// Mirrors the indicator on the terminal.
#[derive(Debug, Default)]
pub struct ConsoleIndicator;

impl StatusIndicator for ConsoleIndicator {
    fn show(&self, pattern: IndicatorPattern) {
        let label = pattern.label();
        let line = match pattern {
            IndicatorPattern::Idle => label.green(),
            IndicatorPattern::Monitoring => label.blue(),
            IndicatorPattern::AskUser => label.yellow(),
            IndicatorPattern::RerackWait | IndicatorPattern::Reracking => label.red(),
            IndicatorPattern::HelpSignal => label.red().bold(),
            IndicatorPattern::Alarm => label.red().bold().reversed(),
        };
        eprintln!("[rack] {line}");
    }
}

/// Fans one pattern out to several indicators.
#[derive(Default)]
pub struct IndicatorSet {
    indicators: Vec<Box<dyn StatusIndicator>>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, indicator: impl StatusIndicator + 'static) -> Self {
        self.indicators.push(Box::new(indicator));
        self
    }
}

impl StatusIndicator for IndicatorSet {
    fn show(&self, pattern: IndicatorPattern) {
        for indicator in &self.indicators {
            indicator.show(pattern);
        }
    }
}

/// Records every pattern shown; used by tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingIndicator {
    shown: Arc<Mutex<Vec<IndicatorPattern>>>,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> Vec<IndicatorPattern> {
        self.shown.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<IndicatorPattern> {
        self.patterns().last().copied()
    }
}

impl StatusIndicator for RecordingIndicator {
    fn show(&self, pattern: IndicatorPattern) {
        self.shown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::SimulatedRack;

    #[test]
    fn test_pin_indicator_levels() {
        let rack = Arc::new(SimulatedRack::new());
        let indicator = PinIndicator::new(rack.clone());

        indicator.show(IndicatorPattern::Idle);
        assert!(rack.led(Led::Green));
        assert!(!rack.led(Led::Blue));
        assert!(!rack.led(Led::Red));

        indicator.show(IndicatorPattern::Monitoring);
        assert!(!rack.led(Led::Green));
        assert!(rack.led(Led::Blue));

        indicator.show(IndicatorPattern::Reracking);
        assert!(!rack.led(Led::Blue));
        assert!(rack.led(Led::Red));
    }

    #[test]
    fn test_indicator_set_fans_out() {
        let first = RecordingIndicator::new();
        let second = RecordingIndicator::new();
        let set = IndicatorSet::new().with(first.clone()).with(second.clone());

        set.show(IndicatorPattern::HelpSignal);
        assert_eq!(first.last(), Some(IndicatorPattern::HelpSignal));
        assert_eq!(second.last(), Some(IndicatorPattern::HelpSignal));
    }
}
