use anyhow::{Context, Result};
use std::path::PathBuf;

use super::Config;

/// Print the active projection table as TOML
pub fn run(config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let toml = config
        .projection_table()
        .to_toml()
        .context("Failed to render projection table")?;
    print!("{}", toml);
    Ok(())
}
