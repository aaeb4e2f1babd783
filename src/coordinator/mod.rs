//! Session coordination
//!
//! - `core`: the [`Coordinator`] event loop and its reactions
//! - `runtime`: threads and channels owned by one session
//! - `lift`: lift confirmation before the motor may run after a fall
//! - `rerack`: the motorised rerack procedure

mod core;
mod lift;
mod rerack;
mod runtime;

pub use self::core::Coordinator;
pub use lift::{wait_for_lift, LiftSignal};
pub use rerack::{RerackController, RerackReport, RerackStop};
