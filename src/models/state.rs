//! Operation state machine for a lifting session

use std::fmt;

use crate::error::SessionError;

/// Where the rack currently is in its operating cycle.
///
/// State machine transitions:
/// - `Idle` -> `Monitoring` (bar lifted off the rack)
/// - `Monitoring` -> `Falling` | `HelpRequested` | `Reracked`
/// - `Falling` -> `Rerack` (once the lift is confirmed)
/// - `HelpRequested` -> `Rerack`
/// - `Reracked` -> `Idle` (bar already on the hooks, no motor needed)
/// - `Rerack` -> `Idle`
///
/// Any state may fall back to `Idle` when a session is aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    /// Waiting for the bar to leave the rack
    #[default]
    Idle,
    /// Monitors are running for the current set
    Monitoring,
    /// A fall was detected; waiting for the lifter to start lifting
    Falling,
    /// The lifter asked for help
    HelpRequested,
    /// The lifter returned the bar by hand
    Reracked,
    /// The motor is driving the bar back onto the rack
    Rerack,
}

impl OperationState {
    /// Check if transitioning from the current state to `next` is valid.
    ///
    /// Staying in the same state is always valid.
    pub fn can_transition_to(&self, next: &OperationState) -> bool {
        if self == next {
            return true;
        }

        match self {
            OperationState::Idle => matches!(next, OperationState::Monitoring),
            OperationState::Monitoring => matches!(
                next,
                OperationState::Falling
                    | OperationState::HelpRequested
                    | OperationState::Reracked
                    | OperationState::Idle
            ),
            OperationState::Falling | OperationState::HelpRequested => {
                matches!(next, OperationState::Rerack | OperationState::Idle)
            }
            OperationState::Reracked | OperationState::Rerack => {
                matches!(next, OperationState::Idle)
            }
        }
    }

    /// Validate a transition and return the new state.
    pub fn try_transition(&self, next: OperationState) -> Result<OperationState, SessionError> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            Err(SessionError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }

    /// Returns the list of states reachable from this one.
    pub fn valid_transitions(&self) -> Vec<OperationState> {
        match self {
            OperationState::Idle => vec![OperationState::Monitoring],
            OperationState::Monitoring => vec![
                OperationState::Falling,
                OperationState::HelpRequested,
                OperationState::Reracked,
                OperationState::Idle,
            ],
            OperationState::Falling | OperationState::HelpRequested => {
                vec![OperationState::Rerack, OperationState::Idle]
            }
            OperationState::Reracked | OperationState::Rerack => vec![OperationState::Idle],
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::Idle => write!(f, "Idle"),
            OperationState::Monitoring => write!(f, "Monitoring"),
            OperationState::Falling => write!(f, "Falling"),
            OperationState::HelpRequested => write!(f, "HelpRequested"),
            OperationState::Reracked => write!(f, "Reracked"),
            OperationState::Rerack => write!(f, "Rerack"),
        }
    }
}
