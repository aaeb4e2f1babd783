//! Session monitors
//!
//! The height tracker samples the sensor ring on its own cadence and is the
//! only writer of the shared height estimate. The other four monitors are
//! passive: they do one sampling pass per permit from the coordinator's
//! [`TickBus`](crate::session::TickBus) and report through the session's
//! event channel.

mod fall;
mod height;
mod help;
mod rack;
mod struggle;

pub use fall::{FallDetector, FallWindow};
pub use height::{HeightTracker, RingDecoder};
pub use help::{HelpLatch, HelpMonitor};
pub use rack::RackMonitor;
pub use struggle::{RepTracker, RepUpdate, StruggleDetector};

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::SessionError;
use crate::models::SessionEvent;
use crate::session::TickReceiver;

/// A monitor that does one sampling pass per tick.
pub trait TickMonitor: Send + 'static {
    /// Short name used for thread names and diagnostics
    const NAME: &'static str;

    /// One sampling pass. Returns the event to report, if any.
    fn sample(&mut self, now: Instant) -> Option<SessionEvent>;
}

/// A running monitor thread.
#[derive(Debug)]
pub struct MonitorHandle {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit.
    pub fn join(self) {
        if self.handle.join().is_err() {
            tracing::error!(monitor = self.name, "monitor thread panicked");
        }
    }
}

/// Spawn a named monitor thread.
pub(crate) fn spawn_named<F>(name: &'static str, body: F) -> Result<MonitorHandle, SessionError>
where
    F: FnOnce() + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(format!("spotter-{name}"))
        .spawn(body)
        .map_err(|source| SessionError::Spawn {
            monitor: name,
            source,
        })?;
    Ok(MonitorHandle { name, handle })
}

/// Run a tick-driven monitor on its own thread.
///
/// The loop ends when the tick bus is dropped, when the event channel is
/// gone, or after the monitor reports a terminal (one-shot) event.
pub fn spawn_tick_monitor<M: TickMonitor>(
    mut monitor: M,
    ticks: TickReceiver,
    events: Sender<SessionEvent>,
) -> Result<MonitorHandle, SessionError> {
    spawn_named(M::NAME, move || {
        while ticks.next_tick() {
            let Some(event) = monitor.sample(Instant::now()) else {
                continue;
            };
            tracing::debug!(monitor = M::NAME, %event, "monitor event");
            if events.send(event).is_err() || event.is_terminal() {
                break;
            }
        }
        tracing::trace!(monitor = M::NAME, "monitor stopped");
    })
}
