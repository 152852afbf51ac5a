//! TOML configuration file support.
//!
//! Instead of repeating flags, settings can be kept in a config file. A
//! `[projection]` table replaces the built-in DLS descriptor table:
//!
//! ```toml
//! # zmes.toml
//! [output]
//! pretty = true
//! measurements = true
//! skip_blobs = false
//!
//! [projection]
//! data_type = "particle size distribution"
//!
//! [[projection.variables]]
//! name = "Sizes"
//! symbol = "d"
//! label = "Hydrodynamic Diameter"
//! units = "nm"
//! dependent = false
//! required = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use zmes::projection::ProjectionTable;

/// Root configuration structure for zmes.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Output settings for the convert command.
    #[serde(default)]
    pub output: OutputConfig,

    /// Custom projection table.
    pub projection: Option<ProjectionTable>,
}

/// Configuration for the convert command.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,

    /// Write measurements instead of the parsed file.
    pub measurements: Option<bool>,

    /// Skip array blobs while reading.
    pub skip_blobs: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML configuration")?;
        if let Some(table) = &config.projection {
            table.validate().context("Invalid [projection] table")?;
        }
        Ok(config)
    }

    /// Load the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map(Self::from_file).transpose().map(Option::unwrap_or_default)
    }

    /// The configured projection table, or the built-in one.
    pub fn projection_table(&self) -> ProjectionTable {
        self.projection.clone().unwrap_or_default()
    }
}
