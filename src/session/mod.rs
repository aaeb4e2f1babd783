//! Session-scoped shared state and scheduling primitives

mod shared;
mod tick;

pub use shared::{CancelFlag, SharedHeight, StruggleFlag};
pub use tick::{Broadcast, TickBus, TickReceiver};
