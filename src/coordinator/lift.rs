//! Lift confirmation after a fall
//!
//! The motor must not be energised while the bar may still be resting on
//! the lifter. After a fall the coordinator waits here until the bar moves
//! or the lifter presses the help button.

use std::thread;
use std::time::Duration;

use crate::error::SessionError;
use crate::hardware::RackIo;
use crate::session::{CancelFlag, SharedHeight};

/// What ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftSignal {
    /// Height estimate moved away from its value at the fall
    Lifted,
    /// Lifter pressed the help button instead
    HelpPressed,
}

/// Block until the height differs from `held` or the help button is pressed.
///
/// Button read failures are logged and treated as "not pressed". Returns
/// [`SessionError::Shutdown`] if `shutdown` is raised while waiting.
pub fn wait_for_lift(
    io: &dyn RackIo,
    height: &SharedHeight,
    held: i32,
    shutdown: &CancelFlag,
    poll: Duration,
) -> Result<LiftSignal, SessionError> {
    tracing::info!(height = held, "waiting for the lifter to move the bar");
    let mut read_failed = false;

    loop {
        if shutdown.is_cancelled() {
            return Err(SessionError::Shutdown);
        }

        let current = height.get();
        if current != held {
            tracing::info!(from = held, to = current, "bar moving again");
            return Ok(LiftSignal::Lifted);
        }

        match io.help_pressed() {
            Ok(true) => {
                tracing::info!(height = current, "help pressed while pinned");
                return Ok(LiftSignal::HelpPressed);
            }
            Ok(false) => read_failed = false,
            Err(e) => {
                if !read_failed {
                    tracing::warn!(error = %e, "help button read failed during lift wait");
                    read_failed = true;
                }
            }
        }

        thread::sleep(poll);
    }
}
