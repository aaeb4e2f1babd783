//! Fan-out of sampling permits to the tick-driven monitors
//!
//! Every subscriber gets its own single-slot channel, so one broadcast
//! reaches every monitor instead of whichever one wins a shared receiver.
//! A monitor that has not consumed its previous permit yet simply keeps
//! that one: permits never queue up, and no monitor can starve another.
//!
//! Dropping the [`TickBus`] disconnects every receiver, which is how the
//! coordinator stops the tick-driven monitors.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

/// Result of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Broadcast {
    /// Subscribers that received a fresh permit
    pub delivered: usize,
    /// Subscribers still holding an unconsumed permit
    pub pending: usize,
}

/// Sending side, owned by the coordinator.
#[derive(Debug, Default)]
pub struct TickBus {
    subscribers: Vec<(&'static str, SyncSender<()>)>,
}

impl TickBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a monitor and hand back its receiving end.
    pub fn subscribe(&mut self, name: &'static str) -> TickReceiver {
        let (tx, rx) = mpsc::sync_channel(1);
        self.subscribers.push((name, tx));
        TickReceiver { name, rx }
    }

    /// Offer one permit to every live subscriber.
    ///
    /// Subscribers whose receiver is gone (monitor finished) are dropped.
    pub fn broadcast(&mut self) -> Broadcast {
        let mut result = Broadcast::default();
        self.subscribers.retain(|(name, tx)| match tx.try_send(()) {
            Ok(()) => {
                result.delivered += 1;
                true
            }
            Err(TrySendError::Full(())) => {
                result.pending += 1;
                true
            }
            Err(TrySendError::Disconnected(())) => {
                tracing::debug!(monitor = *name, "tick subscriber gone");
                false
            }
        });
        result
    }

    /// Number of monitors still listening.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Receiving side, owned by one monitor thread.
#[derive(Debug)]
pub struct TickReceiver {
    name: &'static str,
    rx: Receiver<()>,
}

impl TickReceiver {
    /// Block until the next permit.
    ///
    /// Returns `false` once the bus has been dropped, which means stop.
    pub fn next_tick(&self) -> bool {
        self.rx.recv().is_ok()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
