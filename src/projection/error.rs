/// Errors that can occur while loading or validating a projection table
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// I/O error reading a table file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// The table cannot drive a projection
    #[error("Invalid projection table: {0}")]
    InvalidTable(String),
}
