use crate::parameters::SchemaError;
use crate::store::StoreError;

/// Errors that can occur while reading an export file
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error reading the input file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The relational store could not be opened or failed outside the schema checks
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// The input is not a well-formed export file
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),
}
