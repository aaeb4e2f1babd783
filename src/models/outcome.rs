//! Result of a completed lifting session

use std::time::Duration;

/// How a session concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnding {
    /// Bar fell, the lifter started lifting and the motor reracked it
    FallRecovered,
    /// Lifter asked for help and the motor reracked the bar
    HelpRecovered,
    /// Lifter returned the bar by hand
    ManuallyReracked,
}

/// Summary handed back to the idle loop when a session ends normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub ending: SessionEnding,
    /// Reps counted during the set
    pub reps: u32,
    /// Whether the lifter was flagged as struggling at any point
    pub struggled: bool,
    /// Height estimate when the session ended
    pub final_height: i32,
    /// Time spent with the motor energised
    pub motor_time: Duration,
}

impl SessionOutcome {
    /// Whether the motor was energised at all during the rerack.
    pub fn used_motor(&self) -> bool {
        !self.motor_time.is_zero()
    }
}
