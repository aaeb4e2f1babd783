//! Help button handling
//!
//! Help is requested either by pressing the button while the lifter is
//! flagged as struggling, or by holding it down long enough on its own.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::hardware::RackIo;
use crate::models::SessionEvent;
use crate::session::StruggleFlag;

use super::TickMonitor;

/// Press/hold state machine for the help button.
#[derive(Debug, Clone)]
pub struct HelpLatch {
    pressed_since: Option<Instant>,
    hold: Duration,
}

impl HelpLatch {
    pub fn new(hold: Duration) -> Self {
        Self {
            pressed_since: None,
            hold,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_since.is_some()
    }

    /// Feed one button reading. Returns `true` when help is requested.
    ///
    /// The first pressed reading only starts the hold; a request needs the
    /// button to still be down on a later reading.
    pub fn sample(&mut self, now: Instant, pressed: bool, struggling: bool) -> bool {
        if !pressed {
            self.pressed_since = None;
            return false;
        }
        match self.pressed_since {
            None => {
                self.pressed_since = Some(now);
                false
            }
            Some(since) => struggling || now.saturating_duration_since(since) >= self.hold,
        }
    }
}

/// One-shot monitor reporting [`SessionEvent::HelpRequested`].
pub struct HelpMonitor {
    io: Arc<dyn RackIo>,
    struggling: StruggleFlag,
    latch: HelpLatch,
}

impl HelpMonitor {
    pub fn new(io: Arc<dyn RackIo>, struggling: StruggleFlag, hold: Duration) -> Self {
        Self {
            io,
            struggling,
            latch: HelpLatch::new(hold),
        }
    }
}

impl TickMonitor for HelpMonitor {
    const NAME: &'static str = "help";

    fn sample(&mut self, now: Instant) -> Option<SessionEvent> {
        let pressed = match self.io.help_pressed() {
            Ok(pressed) => pressed,
            Err(e) => {
                tracing::debug!(error = %e, "help button read failed");
                return None;
            }
        };
        let struggling = self.struggling.is_raised();
        if self.latch.sample(now, pressed, struggling) {
            tracing::info!(struggling, "help requested");
            return Some(SessionEvent::HelpRequested);
        }
        None
    }
}
