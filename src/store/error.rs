/// Errors raised by a relational store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O error while staging the snapshot
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A row lacks a column the query was expected to return
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// The store was used after `close()`
    #[error("Store already closed")]
    Closed,
}
