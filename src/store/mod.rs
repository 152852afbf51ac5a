//! # Relational Store Interface
//!
//! Export files are relational snapshots. The parsing core never talks to a
//! database engine directly; it issues queries through [`QuerySource`], which
//! returns rows of named, nullable columns.
//!
//! [`SqliteSource`] is the bundled backend. Other backends (an already-open
//! connection pool, a mock) only need to implement the three trait methods.

mod error;
mod guard;
mod sqlite;

pub use error::StoreError;
pub use guard::SourceGuard;
pub use sqlite::SqliteSource;

use std::sync::Arc;

/// A dynamically typed, nullable column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Integer storage class
    Integer(i64),
    /// Floating point storage class
    Real(f64),
    /// Text storage class
    Text(String),
    /// Blob storage class
    Blob(Vec<u8>),
}

impl SqlValue {
    /// True for SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view; reals with no fractional part are accepted
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Real(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    /// Floating point view; integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Real(v) => Some(*v),
            SqlValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Text view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Blob view
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Render scalars as text, as the store would when casting to TEXT
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Null | SqlValue::Blob(_) => None,
            SqlValue::Integer(v) => Some(v.to_string()),
            SqlValue::Real(v) => Some(v.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

/// One result row with named columns
///
/// Column names are shared between all rows of one result set.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Build a row from shared column names and positional values
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Column names in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw value of a named column.
    ///
    /// Fails only when the column is absent from the result set; a present
    /// column holding NULL is `SqlValue::Null`.
    pub fn get(&self, column: &str) -> Result<&SqlValue, StoreError> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| StoreError::ColumnNotFound(column.to_string()))
    }

    /// Nullable integer column
    pub fn get_i64(&self, column: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.get(column)?.as_i64())
    }

    /// Non-null integer column; NULL or non-numeric counts as missing
    pub fn require_i64(&self, column: &str) -> Result<i64, StoreError> {
        self.get_i64(column)?
            .ok_or_else(|| StoreError::ColumnNotFound(format!("{} (NULL)", column)))
    }

    /// Nullable floating point column
    pub fn get_f64(&self, column: &str) -> Result<Option<f64>, StoreError> {
        Ok(self.get(column)?.as_f64())
    }

    /// Nullable text column; numeric values are rendered as text
    pub fn get_string(&self, column: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(column)?.to_text())
    }

    /// Nullable blob column
    pub fn get_blob(&self, column: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.get(column)?.as_blob().map(<[u8]>::to_vec))
    }
}

/// Query interface over a relational snapshot
pub trait QuerySource {
    /// Run a query and return every row
    fn select_all(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError>;

    /// Run a query and return the first column of the first row, if any
    fn select_scalar(&mut self, query: &str) -> Result<Option<SqlValue>, StoreError>;

    /// Release the underlying resources
    fn close(&mut self) -> Result<(), StoreError>;
}

impl<S: QuerySource + ?Sized> QuerySource for &mut S {
    fn select_all(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        (**self).select_all(query, params)
    }

    fn select_scalar(&mut self, query: &str) -> Result<Option<SqlValue>, StoreError> {
        (**self).select_scalar(query)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        (**self).close()
    }
}
