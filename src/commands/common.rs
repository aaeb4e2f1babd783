//! Helpers shared by the commands

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::SpotterConfig;
use crate::hardware::{RackIo, SysfsRack};
use crate::indicator::{ConsoleIndicator, IndicatorSet, PinIndicator, StatusIndicator};

/// Load the configuration, falling back to defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<SpotterConfig> {
    SpotterConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// GPIO backend plus an indicator that drives the LEDs and mirrors them on
/// the terminal.
pub fn rack_hardware(config: &SpotterConfig) -> (Arc<dyn RackIo>, Arc<dyn StatusIndicator>) {
    let io: Arc<dyn RackIo> = Arc::new(SysfsRack::new(config.pins.clone()));
    let indicator = IndicatorSet::new()
        .with(PinIndicator::new(Arc::clone(&io)))
        .with(ConsoleIndicator);
    (io, Arc::new(indicator))
}
