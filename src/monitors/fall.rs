//! Fall detection over a short window of height changes

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::SafetyThresholds;
use crate::models::SessionEvent;
use crate::session::SharedHeight;

use super::TickMonitor;

/// Sliding window of the most recent distinct height samples.
#[derive(Debug, Clone)]
pub struct FallWindow {
    samples: VecDeque<(Instant, i32)>,
    capacity: usize,
    window: Duration,
    min_drop: i32,
}

impl FallWindow {
    pub fn new(capacity: usize, window: Duration, min_drop: i32) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            window,
            min_drop,
        }
    }

    pub fn from_thresholds(thresholds: &SafetyThresholds) -> Self {
        Self::new(
            thresholds.fall_samples,
            thresholds.fall_window(),
            thresholds.fall_drop,
        )
    }

    /// Record a height reading. Returns `true` when it completes a fall.
    ///
    /// Readings equal to the last recorded height are ignored.
    pub fn observe(&mut self, now: Instant, height: i32) -> bool {
        if self.samples.back().is_some_and(|&(_, last)| last == height) {
            return false;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((now, height));

        let Some(&(oldest_at, oldest)) = self.samples.front() else {
            return false;
        };
        let recent = now.saturating_duration_since(oldest_at) < self.window;
        recent && oldest - height >= self.min_drop
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One-shot monitor reporting [`SessionEvent::Fallen`].
pub struct FallDetector {
    height: SharedHeight,
    window: FallWindow,
}

impl FallDetector {
    pub fn new(height: SharedHeight, thresholds: &SafetyThresholds) -> Self {
        Self {
            height,
            window: FallWindow::from_thresholds(thresholds),
        }
    }
}

impl TickMonitor for FallDetector {
    const NAME: &'static str = "fall";

    fn sample(&mut self, now: Instant) -> Option<SessionEvent> {
        let height = self.height.get();
        if self.window.observe(now, height) {
            tracing::info!(height, "fall detected");
            return Some(SessionEvent::Fallen);
        }
        None
    }
}
