//! Run command - starts the spotter daemon in the foreground

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::atomic::Ordering;

use super::common::{load_config, rack_hardware};
use crate::daemon::Daemon;

pub fn execute(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let (io, indicator) = rack_hardware(&config);
    let daemon = Daemon::new(config, io, indicator);

    let shutdown = daemon.shutdown_flag();
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::Relaxed);
    })
    .context("Failed to set Ctrl+C handler")?;

    println!("{} Spotter running, Ctrl+C to stop", "→".cyan().bold());
    let stats = daemon.run()?;

    println!(
        "{} Stopped after {} set(s): {} completed, {} aborted",
        "✓".green().bold(),
        stats.sessions,
        stats.completed,
        stats.aborted
    );
    Ok(())
}
