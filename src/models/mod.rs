pub mod constants;
pub mod event;
pub mod outcome;
pub mod state;

pub use event::SessionEvent;
pub use outcome::{SessionEnding, SessionOutcome};
pub use state::OperationState;
