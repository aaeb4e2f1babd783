//! Rep counting and struggle detection
//!
//! A rep is complete when the bar peaks: the middle of the last three
//! distinct heights is higher than both of its neighbours. The first rep's
//! duration becomes the baseline; a later rep running past
//! `multiplier x baseline` flags the lifter as struggling.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::models::SessionEvent;
use crate::session::SharedHeight;

use super::TickMonitor;

/// What one height change meant for the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepUpdate {
    /// Nothing notable
    None,
    /// A rep just finished; carries the running count
    Completed(u32),
    /// The current rep is overdue
    Struggling,
}

/// Rep bookkeeping, driven with explicit timestamps.
#[derive(Debug, Clone)]
pub struct RepTracker {
    started: Instant,
    recent: VecDeque<i32>,
    reps: u32,
    baseline: Option<Duration>,
    rep_started: Instant,
    multiplier: u32,
}

impl RepTracker {
    pub fn new(started: Instant, multiplier: u32) -> Self {
        Self {
            started,
            recent: VecDeque::with_capacity(3),
            reps: 0,
            baseline: None,
            rep_started: started,
            multiplier,
        }
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    /// Duration of the first rep, once known.
    pub fn baseline(&self) -> Option<Duration> {
        self.baseline
    }

    /// Record a height reading.
    pub fn observe(&mut self, now: Instant, height: i32) -> RepUpdate {
        if self.recent.back() == Some(&height) {
            return RepUpdate::None;
        }
        if self.recent.len() == 3 {
            self.recent.pop_front();
        }
        self.recent.push_back(height);

        if self.is_peak() {
            self.reps += 1;
            if self.baseline.is_none() {
                let first = now.saturating_duration_since(self.started);
                // A zero-length first rep cannot serve as a baseline.
                self.baseline = (!first.is_zero()).then_some(first);
            }
            self.rep_started = now;
            return RepUpdate::Completed(self.reps);
        }

        if let Some(baseline) = self.baseline {
            let limit = baseline.saturating_mul(self.multiplier);
            if now.saturating_duration_since(self.rep_started) > limit {
                return RepUpdate::Struggling;
            }
        }
        RepUpdate::None
    }

    fn is_peak(&self) -> bool {
        match (self.recent.front(), self.recent.get(1), self.recent.get(2)) {
            (Some(&before), Some(&peak), Some(&after)) => peak > before && peak > after,
            _ => false,
        }
    }
}

/// Long-running monitor reporting rep completions and struggling.
pub struct StruggleDetector {
    height: SharedHeight,
    tracker: RepTracker,
}

impl StruggleDetector {
    pub fn new(height: SharedHeight, session_start: Instant, multiplier: u32) -> Self {
        Self {
            height,
            tracker: RepTracker::new(session_start, multiplier),
        }
    }
}

impl TickMonitor for StruggleDetector {
    const NAME: &'static str = "struggle";

    fn sample(&mut self, now: Instant) -> Option<SessionEvent> {
        match self.tracker.observe(now, self.height.get()) {
            RepUpdate::None => None,
            RepUpdate::Completed(count) => Some(SessionEvent::RepCompleted(count)),
            RepUpdate::Struggling => Some(SessionEvent::Struggling),
        }
    }
}
