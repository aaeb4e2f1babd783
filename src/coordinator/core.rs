//! Session coordinator: runs one set from lift-off to the rack

use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::SpotterConfig;
use crate::error::SessionError;
use crate::hardware::RackIo;
use crate::indicator::{IndicatorPattern, StatusIndicator};
use crate::journal::{JournalEntry, SessionJournal};
use crate::models::{OperationState, SessionEnding, SessionEvent, SessionOutcome};
use crate::session::CancelFlag;

use super::lift::{wait_for_lift, LiftSignal};
use super::rerack::{RerackController, RerackReport};
use super::runtime::SessionRuntime;

/// Owns a session end to end: starts the monitors, reacts to their events,
/// and drives the rerack when the lifter needs it.
pub struct Coordinator {
    io: Arc<dyn RackIo>,
    indicator: Arc<dyn StatusIndicator>,
    config: SpotterConfig,
    shutdown: CancelFlag,
    state: OperationState,
}

impl Coordinator {
    pub fn new(
        io: Arc<dyn RackIo>,
        indicator: Arc<dyn StatusIndicator>,
        config: SpotterConfig,
    ) -> Self {
        Self {
            io,
            indicator,
            config,
            shutdown: CancelFlag::new(),
            state: OperationState::Idle,
        }
    }

    /// Observe an external shutdown flag while a session runs.
    pub fn with_shutdown(mut self, shutdown: CancelFlag) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Run one session to completion.
    ///
    /// On success the coordinator is back in `Idle` with the motor off.
    /// Every error path goes through [`Coordinator::abort`] first, so the
    /// rack is also in its safe state when an error is returned.
    pub fn run_session(
        &mut self,
        journal: &mut dyn SessionJournal,
    ) -> Result<SessionOutcome, SessionError> {
        if let Err(e) = self.transition(OperationState::Monitoring) {
            return Err(self.abort(None, journal, e));
        }
        record(journal, JournalEntry::SetStart);
        self.indicator.show(IndicatorPattern::Monitoring);

        let mut runtime = match SessionRuntime::start(&self.io, &self.config) {
            Ok(runtime) => runtime,
            Err(e) => return Err(self.abort(None, journal, e)),
        };

        match self.supervise(&mut runtime, journal) {
            Ok(outcome) => {
                tracing::info!(
                    ending = ?outcome.ending,
                    reps = outcome.reps,
                    struggled = outcome.struggled,
                    "session complete"
                );
                Ok(outcome)
            }
            Err(e) => Err(self.abort(Some(runtime), journal, e)),
        }
    }

    /// Event loop: handle a pending event, or grant the monitors a tick.
    fn supervise(
        &mut self,
        runtime: &mut SessionRuntime,
        journal: &mut dyn SessionJournal,
    ) -> Result<SessionOutcome, SessionError> {
        let tick_interval = self.config.timing.tick_interval();
        let mut reps = 0;

        loop {
            if self.shutdown.is_cancelled() {
                return Err(SessionError::Shutdown);
            }

            let event = match runtime.try_event() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => {
                    if let Some(monitor) = runtime.exited_monitor() {
                        // It may have reported just before exiting.
                        match runtime.try_event() {
                            Ok(event) => event,
                            Err(_) => return Err(SessionError::MonitorExited { monitor }),
                        }
                    } else {
                        runtime.tick();
                        thread::sleep(tick_interval);
                        continue;
                    }
                }
                Err(TryRecvError::Disconnected) => return Err(SessionError::EventStreamClosed),
            };

            tracing::debug!(%event, state = %self.state, "session event");
            match event {
                SessionEvent::RepCompleted(count) => {
                    reps = count;
                    record(journal, JournalEntry::RepFinished(count));
                }
                SessionEvent::Struggling => {
                    if runtime.struggle.raise() {
                        tracing::info!(reps, "lifter struggling");
                        record(journal, JournalEntry::AskedForHelp);
                        self.indicator.show(IndicatorPattern::AskUser);
                    }
                }
                SessionEvent::Fallen => return self.recover_from_fall(runtime, journal, reps),
                SessionEvent::HelpRequested => {
                    return self.recover_from_help(runtime, journal, reps)
                }
                SessionEvent::Reracked => return self.finish_reracked(runtime, journal, reps),
            }
        }
    }

    fn recover_from_fall(
        &mut self,
        runtime: &mut SessionRuntime,
        journal: &mut dyn SessionJournal,
        reps: u32,
    ) -> Result<SessionOutcome, SessionError> {
        runtime.stop_monitors();
        let held = runtime.height.get();
        self.transition(OperationState::Falling)?;
        record(journal, JournalEntry::BarbellFallen);
        self.indicator.show(IndicatorPattern::RerackWait);

        let signal = wait_for_lift(
            self.io.as_ref(),
            &runtime.height,
            held,
            &self.shutdown,
            self.config.timing.lift_poll(),
        )?;
        match signal {
            LiftSignal::Lifted => record(journal, JournalEntry::BarbellLifted),
            LiftSignal::HelpPressed => {
                record(journal, JournalEntry::HelpButtonPressed);
                self.indicator.show(IndicatorPattern::HelpSignal);
            }
        }

        let report = self.rerack(runtime)?;
        record(journal, JournalEntry::RerackedSafely);
        Ok(self.finish(runtime, journal, SessionEnding::FallRecovered, reps, report.motor_time))
    }

    fn recover_from_help(
        &mut self,
        runtime: &mut SessionRuntime,
        journal: &mut dyn SessionJournal,
        reps: u32,
    ) -> Result<SessionOutcome, SessionError> {
        runtime.stop_monitors();
        self.transition(OperationState::HelpRequested)?;
        record(journal, JournalEntry::HelpButtonPressed);
        self.indicator.show(IndicatorPattern::HelpSignal);

        let report = self.rerack(runtime)?;
        record(journal, JournalEntry::RerackedSafely);
        Ok(self.finish(runtime, journal, SessionEnding::HelpRecovered, reps, report.motor_time))
    }

    fn finish_reracked(
        &mut self,
        runtime: &mut SessionRuntime,
        journal: &mut dyn SessionJournal,
        reps: u32,
    ) -> Result<SessionOutcome, SessionError> {
        runtime.stop_monitors();
        self.transition(OperationState::Reracked)?;
        record(journal, JournalEntry::BarbellReracked);
        Ok(self.finish(
            runtime,
            journal,
            SessionEnding::ManuallyReracked,
            reps,
            Duration::ZERO,
        ))
    }

    fn rerack(&mut self, runtime: &SessionRuntime) -> Result<RerackReport, SessionError> {
        self.transition(OperationState::Rerack)?;
        self.indicator.show(IndicatorPattern::Reracking);
        let controller =
            RerackController::new(self.io.as_ref(), self.indicator.as_ref(), &self.config);
        Ok(controller.run(&runtime.height)?)
    }

    /// Stop the height tracker last, close the set and return to idle.
    fn finish(
        &mut self,
        runtime: &mut SessionRuntime,
        journal: &mut dyn SessionJournal,
        ending: SessionEnding,
        reps: u32,
        motor_time: Duration,
    ) -> SessionOutcome {
        runtime.stop_tracker();
        record(journal, JournalEntry::SetEnd);
        self.indicator.show(IndicatorPattern::Idle);
        self.state = OperationState::Idle;

        SessionOutcome {
            ending,
            reps,
            struggled: runtime.struggle.is_raised(),
            final_height: runtime.height.get(),
            motor_time,
        }
    }

    /// Put the rack in its safe state after a session error.
    ///
    /// Motor off, every monitor stopped and joined, alarm shown (unless the
    /// rerack controller already signalled its own fault), the abort
    /// journalled, and the coordinator back in `Idle`.
    fn abort(
        &mut self,
        runtime: Option<SessionRuntime>,
        journal: &mut dyn SessionJournal,
        err: SessionError,
    ) -> SessionError {
        tracing::error!(error = %err, state = %self.state, "aborting session");

        if let Err(e) = self.io.set_motor(false) {
            tracing::error!(error = %e, "failed to stop motor during abort");
        }
        if let Some(runtime) = runtime {
            runtime.shutdown();
        }

        let signalled = matches!(&err, SessionError::Rerack(e) if e.is_safety_fault());
        if !signalled {
            self.indicator.show(IndicatorPattern::Alarm);
        }
        record(journal, JournalEntry::SetAborted(err.to_string()));
        self.state = OperationState::Idle;
        err
    }

    fn transition(&mut self, next: OperationState) -> Result<(), SessionError> {
        let next = self.state.try_transition(next)?;
        if next != self.state {
            tracing::info!(from = %self.state, to = %next, "state transition");
        }
        self.state = next;
        Ok(())
    }
}

/// Journal failures never interrupt a session.
fn record(journal: &mut dyn SessionJournal, entry: JournalEntry) {
    tracing::debug!(%entry, "journal");
    if let Err(e) = journal.record(&entry) {
        tracing::warn!(error = %e, %entry, "failed to write journal entry");
    }
}
