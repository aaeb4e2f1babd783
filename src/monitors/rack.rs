//! Manual rerack detection

use std::sync::Arc;
use std::time::Instant;

use crate::hardware::RackIo;
use crate::models::SessionEvent;

use super::TickMonitor;

/// One-shot monitor reporting [`SessionEvent::Reracked`] once the bar is
/// back on the hooks.
pub struct RackMonitor {
    io: Arc<dyn RackIo>,
}

impl RackMonitor {
    pub fn new(io: Arc<dyn RackIo>) -> Self {
        Self { io }
    }
}

impl TickMonitor for RackMonitor {
    const NAME: &'static str = "rack";

    fn sample(&mut self, _now: Instant) -> Option<SessionEvent> {
        match self.io.rack_seated() {
            Ok(true) => Some(SessionEvent::Reracked),
            Ok(false) => None,
            Err(e) => {
                tracing::debug!(error = %e, "rack sensor read failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::SimulatedRack;

    #[test]
    fn test_reports_when_seated() {
        let rack = Arc::new(SimulatedRack::new());
        let mut monitor = RackMonitor::new(rack.clone());
        assert_eq!(monitor.sample(Instant::now()), None);

        rack.set_rack_seated(true);
        assert_eq!(
            monitor.sample(Instant::now()),
            Some(SessionEvent::Reracked)
        );
    }

    #[test]
    fn test_read_fault_is_not_a_rerack() {
        let rack = Arc::new(SimulatedRack::new());
        rack.set_rack_seated(true);
        rack.set_faulted(true);
        let mut monitor = RackMonitor::new(rack);
        assert_eq!(monitor.sample(Instant::now()), None);
    }
}
