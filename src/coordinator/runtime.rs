//! Threads and channels owned by one running session

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use crate::config::SpotterConfig;
use crate::error::SessionError;
use crate::hardware::RackIo;
use crate::models::SessionEvent;
use crate::monitors::{
    spawn_tick_monitor, FallDetector, HeightTracker, HelpMonitor, MonitorHandle, RackMonitor,
    StruggleDetector, TickMonitor,
};
use crate::session::{CancelFlag, SharedHeight, StruggleFlag, TickBus};

/// Session-scoped state: the height estimate, the struggle flag, the tick
/// bus and every monitor thread.
///
/// Dropping the runtime stops every monitor without waiting for them.
pub(crate) struct SessionRuntime {
    pub height: SharedHeight,
    pub struggle: StruggleFlag,
    events: Receiver<SessionEvent>,
    bus: Option<TickBus>,
    tracker_cancel: CancelFlag,
    tracker: Option<MonitorHandle>,
    monitors: Vec<MonitorHandle>,
}

impl SessionRuntime {
    /// Create the session state and start all five monitors.
    pub fn start(io: &Arc<dyn RackIo>, config: &SpotterConfig) -> Result<Self, SessionError> {
        let started = Instant::now();
        let thresholds = &config.thresholds;
        let (tx, rx) = mpsc::channel();

        let mut bus = TickBus::new();
        let fall_ticks = bus.subscribe(FallDetector::NAME);
        let struggle_ticks = bus.subscribe(StruggleDetector::NAME);
        let help_ticks = bus.subscribe(HelpMonitor::NAME);
        let rack_ticks = bus.subscribe(RackMonitor::NAME);

        let mut runtime = Self {
            height: SharedHeight::new(thresholds.reference_height),
            struggle: StruggleFlag::new(),
            events: rx,
            bus: Some(bus),
            tracker_cancel: CancelFlag::new(),
            tracker: None,
            monitors: Vec::with_capacity(4),
        };

        runtime.tracker = Some(
            HeightTracker::new(
                Arc::clone(io),
                runtime.height.clone(),
                runtime.tracker_cancel.clone(),
                config.timing.height_sample(),
                config.timing.pivot_timeout(),
            )
            .spawn()?,
        );

        let fall = FallDetector::new(runtime.height.clone(), thresholds);
        runtime
            .monitors
            .push(spawn_tick_monitor(fall, fall_ticks, tx.clone())?);

        let struggle = StruggleDetector::new(
            runtime.height.clone(),
            started,
            thresholds.struggle_multiplier,
        );
        runtime
            .monitors
            .push(spawn_tick_monitor(struggle, struggle_ticks, tx.clone())?);

        let help = HelpMonitor::new(
            Arc::clone(io),
            runtime.struggle.clone(),
            thresholds.help_hold(),
        );
        runtime
            .monitors
            .push(spawn_tick_monitor(help, help_ticks, tx.clone())?);

        let rack = RackMonitor::new(Arc::clone(io));
        runtime
            .monitors
            .push(spawn_tick_monitor(rack, rack_ticks, tx)?);

        tracing::debug!(
            height = runtime.height.get(),
            monitors = runtime.monitors.len() + 1,
            "session monitors started"
        );
        Ok(runtime)
    }

    pub fn try_event(&self) -> Result<SessionEvent, TryRecvError> {
        self.events.try_recv()
    }

    /// Grant every tick-driven monitor one sampling pass.
    pub fn tick(&mut self) {
        if let Some(bus) = self.bus.as_mut() {
            let result = bus.broadcast();
            tracing::trace!(
                delivered = result.delivered,
                pending = result.pending,
                "tick"
            );
        }
    }

    /// First monitor whose thread has ended, if any.
    pub fn exited_monitor(&self) -> Option<&'static str> {
        self.tracker
            .iter()
            .chain(self.monitors.iter())
            .find(|handle| handle.is_finished())
            .map(MonitorHandle::name)
    }

    /// Stop the tick-driven monitors. The height tracker keeps running.
    pub fn stop_monitors(&mut self) {
        if self.bus.take().is_some() {
            tracing::debug!("tick-driven monitors stopped");
        }
    }

    /// Stop the height tracker and wait for it to exit.
    pub fn stop_tracker(&mut self) {
        self.tracker_cancel.cancel();
        if let Some(tracker) = self.tracker.take() {
            tracker.join();
        }
    }

    /// Stop everything and wait for every thread.
    pub fn shutdown(mut self) {
        self.stop_monitors();
        self.stop_tracker();
        for monitor in self.monitors.drain(..) {
            monitor.join();
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.bus = None;
        self.tracker_cancel.cancel();
    }
}
