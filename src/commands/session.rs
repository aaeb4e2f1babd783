//! Session command - runs exactly one set immediately (bench testing)

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

    let outcome = daemon.run_single_session()?;
    println!(
        "{} Set over ({:?}): {} rep(s), final height {}{}",
        "✓".green().bold(),
        outcome.ending,
        outcome.reps,
        outcome.final_height,
        if outcome.used_motor() {
            format!(", motor {}ms", outcome.motor_time.as_millis())
        } else {
            String::new()
        }
    );
    if outcome.struggled {
        println!("{} Lifter was flagged as struggling", "!".yellow().bold());
    }
    Ok(())
}
