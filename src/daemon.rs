//! Long-running idle loop
//!
//! Polls the rack sensor and hands each set to the [`Coordinator`]. A new
//! session only starts once the bar has been seen back on the rack since
//! the previous one, so a bar the motor parked just short of the hooks
//! does not immediately start another set.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::SpotterConfig;
use crate::coordinator::Coordinator;
use crate::error::SessionError;
use crate::hardware::RackIo;
use crate::indicator::{IndicatorPattern, StatusIndicator};
use crate::journal::{FileJournal, SessionJournal, TracingJournal};
use crate::models::SessionOutcome;
use crate::session::CancelFlag;

/// Longest single sleep while waiting, so shutdown stays responsive.
const SHUTDOWN_CHECK: Duration = Duration::from_millis(50);

/// Session counts for one daemon run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaemonStats {
    pub sessions: u32,
    pub completed: u32,
    pub aborted: u32,
}

pub struct Daemon {
    config: SpotterConfig,
    io: Arc<dyn RackIo>,
    indicator: Arc<dyn StatusIndicator>,
    shutdown_flag: Arc<AtomicBool>,
}

impl Daemon {
    pub fn new(
        config: SpotterConfig,
        io: Arc<dyn RackIo>,
        indicator: Arc<dyn StatusIndicator>,
    ) -> Self {
        Self {
            config,
            io,
            indicator,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the daemon (and any running session) when set.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_flag)
    }

    fn coordinator(&self) -> Coordinator {
        Coordinator::new(
            Arc::clone(&self.io),
            Arc::clone(&self.indicator),
            self.config.clone(),
        )
        .with_shutdown(CancelFlag::from_arc(self.shutdown_flag()))
    }

    /// Run the idle loop until shutdown.
    pub fn run(&self) -> Result<DaemonStats> {
        let mut coordinator = self.coordinator();
        let mut stats = DaemonStats::default();
        // A bar already off the rack at startup counts as a set in progress.
        let mut armed = true;
        let mut read_failed = false;

        tracing::info!(
            poll_ms = self.config.timing.idle_poll_ms,
            journal_dir = %self.config.journal.dir.display(),
            "spotter idle"
        );
        self.indicator.show(IndicatorPattern::Idle);

        while !self.shutdown_flag.load(Ordering::Relaxed) {
            match self.io.rack_seated() {
                Ok(true) => {
                    read_failed = false;
                    if !armed {
                        tracing::debug!("bar back on the rack");
                        self.indicator.show(IndicatorPattern::Idle);
                        armed = true;
                    }
                }
                Ok(false) => {
                    read_failed = false;
                    if armed {
                        armed = false;
                        stats.sessions += 1;
                        match self.session(&mut coordinator) {
                            Ok(_) => stats.completed += 1,
                            Err(SessionError::Shutdown) => break,
                            Err(_) => stats.aborted += 1,
                        }
                    }
                }
                Err(e) => {
                    if !read_failed {
                        tracing::warn!(error = %e, "rack sensor read failed");
                        read_failed = true;
                    }
                }
            }
            self.sleep(self.config.timing.idle_poll());
        }

        self.io
            .set_motor(false)
            .context("Failed to switch the motor off on shutdown")?;
        tracing::info!(
            sessions = stats.sessions,
            completed = stats.completed,
            aborted = stats.aborted,
            "spotter stopped"
        );
        Ok(stats)
    }

    /// Run exactly one session right away, ignoring the rack sensor.
    pub fn run_single_session(&self) -> Result<SessionOutcome> {
        let mut coordinator = self.coordinator();
        self.session(&mut coordinator)
            .context("Session did not complete")
    }

    fn session(&self, coordinator: &mut Coordinator) -> Result<SessionOutcome, SessionError> {
        let mut journal = self.open_journal();
        tracing::info!("bar off the rack, set started");
        let result = coordinator.run_session(journal.as_mut());
        match &result {
            Ok(outcome) => tracing::info!(
                ending = ?outcome.ending,
                reps = outcome.reps,
                motor_ms = outcome.motor_time.as_millis() as u64,
                "set finished"
            ),
            Err(e) => tracing::error!(error = %e, "set aborted"),
        }
        result
    }

    /// One journal file per session; diagnostics only if it cannot be created.
    fn open_journal(&self) -> Box<dyn SessionJournal> {
        let journal = &self.config.journal;
        match FileJournal::create(&journal.dir, &journal.stem) {
            Ok(file) => {
                tracing::debug!(path = %file.path().display(), "journal opened");
                Box::new(file)
            }
            Err(e) => {
                tracing::warn!(error = %e, "journal unavailable, logging entries only");
                Box::new(TracingJournal)
            }
        }
    }

    fn sleep(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while !self.shutdown_flag.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(SHUTDOWN_CHECK.min(deadline - now));
        }
    }
}
