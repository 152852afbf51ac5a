//! # Export File Reader
//!
//! Parses a complete export file into an [`ExportFile`]: schema version,
//! file metadata and every record with its populated parameter tree.
//!
//! Parsing is all-or-nothing. A structural problem anywhere in the file aborts
//! the parse with a [`ReaderError`]; no partial record list is returned.
//!
//! ## Example
//!
//! ```rust,no_run
//! use zmes::reader::ExportReader;
//!
//! let file = ExportReader::new().read_path("measurement.zmes")?;
//! println!("Schema version: {}", file.schema_version);
//!
//! for record in &file.records {
//!     if let Some(name) = record.parameters.find("Sample Name") {
//!         println!("Record {}: {:?}", record.id, name.value);
//!     }
//! }
//! # Ok::<(), zmes::reader::ReaderError>(())
//! ```

mod config;
mod error;
mod model;
mod open;


pub use config::ReaderConfig;
pub use error::ReaderError;
pub use model::{parse_timestamp, ExportFile, Record, RecordGroup, RecordRow};

use std::path::Path;

/// Reader for export files
#[derive(Debug, Clone, Default)]
pub struct ExportReader {
    config: ReaderConfig,
}

impl ExportReader {
    /// Reader with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader with a custom configuration
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl ExportFile {
    /// Read an export file from disk with the default configuration
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        ExportReader::new().read_path(path)
    }

    /// Parse an export file from memory with the default configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError> {
        ExportReader::new().parse_bytes(bytes)
    }
}
