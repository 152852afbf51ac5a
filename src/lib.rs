//! # zmes - Instrument Export Reader
//!
//! `zmes` parses measurement export files written by DLS particle-sizing
//! software into a typed parameter tree per record, and projects those records
//! onto an instrument-independent [`Measurement`](projection::Measurement)
//! schema.
//!
//! An export file is a relational database. It holds a registry of parameter
//! types, one parameter tree shape per root type, and per-record values stored
//! in typed columns. Array values are packed `f64` data behind a short marker
//! byte sequence inside a blob column.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zmes::prelude::*;
//!
//! let file = ExportFile::open("measurement.zmes")?;
//! println!("Schema version {}, {} records", file.schema_version, file.len());
//!
//! for record in &file.records {
//!     if let Some(sizes) = record.parameters.find("Sizes").and_then(|p| p.value.as_ref()) {
//!         println!("Record {}: {}", record.id, sizes);
//!     }
//! }
//!
//! for measurement in project(&file) {
//!     println!("{} ({} settings)", measurement.title, measurement.settings.len());
//! }
//! # Ok::<(), zmes::reader::ReaderError>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`store`]: Query source abstraction over the embedded database
//! - [`schema`]: Table, column and query definitions plus the data-type codes
//! - [`binary`]: Marker-delimited `f64` array decoding
//! - [`parameters`]: Type registry, tree assembly and typed value extraction
//! - [`reader`]: Whole-file parsing into an [`ExportFile`](reader::ExportFile)
//! - [`projection`]: Descriptor-driven mapping onto measurements
//!
//! ## Features
//!
//! - `colorized_output` (default): colored terminal output in the CLI
//! - `parallel`: [`Projector::project_par`](projection::Projector) using rayon

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod binary;
pub mod parameters;
pub mod projection;
pub mod reader;
pub mod schema;
pub mod store;

#[cfg(test)]
mod fixtures;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::binary::{ArrayDecoder, ELEMENT_MARKER};
    pub use crate::parameters::{Parameter, ParameterType, ParameterValue, SchemaError};
    pub use crate::projection::{
        project, Measurement, ProjectionError, ProjectionTable, Projector, Setting, SettingValue,
        Variable,
    };
    pub use crate::reader::{
        ExportFile, ExportReader, ReaderConfig, ReaderError, Record, RecordGroup,
    };
    pub use crate::schema::DataTypeCode;
    pub use crate::store::{QuerySource, SqliteSource, StoreError};
}
