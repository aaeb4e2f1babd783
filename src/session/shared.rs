//! State shared between the session's threads

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

/// The session's height estimate, in ring steps.
///
/// Written only by the height tracker; read by the detectors, the
/// coordinator's lift-confirmation wait and the rerack controller.
/// Clones share the same value.
#[derive(Debug, Clone)]
pub struct SharedHeight(Arc<AtomicI32>);

impl SharedHeight {
    pub fn new(initial: i32) -> Self {
        Self(Arc::new(AtomicI32::new(initial)))
    }

    pub fn get(&self) -> i32 {
        self.0.load(Ordering::Acquire)
    }

    /// Apply a signed step. Returns the new height.
    pub fn apply(&self, delta: i32) -> i32 {
        self.0.fetch_add(delta, Ordering::AcqRel) + delta
    }
}

/// Cooperative stop signal, checked once per loop pass.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing flag (for example the daemon's shutdown flag).
    pub fn from_arc(flag: Arc<AtomicBool>) -> Self {
        Self(flag)
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Sticky flag set once the lifter has been seen struggling.
#[derive(Debug, Clone, Default)]
pub struct StruggleFlag(Arc<AtomicBool>);

impl StruggleFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` if it was not already raised.
    pub fn raise(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
