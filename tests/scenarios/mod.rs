//! End-to-end session scenarios
//!
//! Each test drives a full coordinator session against the simulated rack:
//! the bar is moved around the sensor ring, buttons are pressed and the rack
//! is re-seated from a script thread while the session runs.

pub mod fall;
pub mod helpers;
pub mod help;
pub mod rack;
