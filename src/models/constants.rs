/// Number of proximity sensors on the ring around the bar sleeve.
/// Sensors sit at 90° intervals, so one full turn of the ring is four steps.
pub const RING_SIZE: usize = 4;

/// Height estimate assigned when a session starts (bar resting in the hooks).
pub const REFERENCE_HEIGHT: i32 = 50;

/// Height at which a motorised rerack is considered complete.
/// Two steps below the reference height to absorb sensor drift.
pub const RERACK_TARGET_HEIGHT: i32 = 48;

/// Window inside which a drop counts as a fall.
pub const FALL_WINDOW_MS: u64 = 500;

/// Number of distinct height samples kept by the fall window.
pub const FALL_SAMPLE_COUNT: usize = 5;

/// Minimum drop, in ring steps, across the fall window.
pub const FALL_MIN_DROP: i32 = 4;

/// A rep slower than this multiple of the first rep counts as struggling.
pub const STRUGGLE_MULTIPLIER: u32 = 2;

/// Continuous help-button hold that requests assistance on its own.
pub const HELP_HOLD_MS: u64 = 2000;

/// Cadence of the idle loop waiting for the bar to leave the rack.
pub const IDLE_POLL_MS: u64 = 500;

/// Interval between tick broadcasts when no event is pending.
pub const TICK_INTERVAL_MS: u64 = 5;

/// Pause between height tracker sampling passes.
pub const HEIGHT_SAMPLE_US: u64 = 500;

/// How long the height tracker waits for any ring sensor before falling back.
pub const PIVOT_TIMEOUT_MS: u64 = 2000;

/// Rerack supervision cadence.
pub const RERACK_POLL_MS: u64 = 5;

/// Hard ceiling on a single rerack run.
pub const RERACK_MAX_MS: u64 = 8000;

/// Motor is cut if the bar has not moved this long after energising.
pub const RERACK_STALL_MS: u64 = 1500;

/// Polling cadence of the post-fall lift-confirmation wait.
pub const LIFT_POLL_MS: u64 = 5;

/// Bound on journal file-name collision retries.
pub const JOURNAL_MAX_SUFFIX: u32 = 10_000;

/// Default BCM pin assignment for the reference board.
pub mod pins {
    pub const RACK: u32 = 17;
    pub const HELP: u32 = 27;
    pub const RING: [u32; 4] = [5, 6, 13, 19];
    pub const MOTOR: u32 = 18;
    pub const LED_RED: u32 = 23;
    pub const LED_BLUE: u32 = 24;
    pub const LED_GREEN: u32 = 25;
}
