//! Config command - prints the effective configuration

use anyhow::{Context, Result};
use std::path::Path;

use super::common::load_config;

/// Render the effective configuration as TOML.
pub fn render(config_path: &Path) -> Result<String> {
    let config = load_config(config_path)?;
    config
        .to_toml()
        .context("Failed to render configuration")
}

pub fn execute(config_path: &Path) -> Result<()> {
    print!("{}", render(config_path)?);
    Ok(())
}
