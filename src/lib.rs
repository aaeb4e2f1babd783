pub mod commands;
pub mod config;
pub mod coordinator;
pub mod daemon;
pub mod error;
pub mod hardware;
pub mod indicator;
pub mod journal;
pub mod logging;
pub mod models;
pub mod monitors;
pub mod session;
