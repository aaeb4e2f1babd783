//! Events emitted by the session monitors

use std::fmt;

/// Safety events crossing the monitor/coordinator boundary.
///
/// Each variant has exactly one producer:
/// - `RepCompleted` and `Struggling` come from the struggle detector
/// - `Fallen` comes from the fall detector
/// - `HelpRequested` comes from the help monitor
/// - `Reracked` comes from the rack monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A rep finished; carries the running rep count for the session
    RepCompleted(u32),
    /// Current rep is taking abnormally long compared to the first one
    Struggling,
    /// The bar dropped quickly by a large amount
    Fallen,
    /// The lifter asked for assistance with the help button
    HelpRequested,
    /// The bar was put back on the rack by hand
    Reracked,
}

impl SessionEvent {
    /// Whether the event ends the monitoring phase of the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::Fallen | SessionEvent::HelpRequested | SessionEvent::Reracked
        )
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::RepCompleted(count) => write!(f, "rep-completed({count})"),
            SessionEvent::Struggling => write!(f, "struggling"),
            SessionEvent::Fallen => write!(f, "fallen"),
            SessionEvent::HelpRequested => write!(f, "help-requested"),
            SessionEvent::Reracked => write!(f, "reracked"),
        }
    }
}
