use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OpenFlags, OptionalExtension, ToSql};
use tempfile::NamedTempFile;

use super::{QuerySource, Row, SqlValue, StoreError};

/// SQLite-backed [`QuerySource`]
///
/// Export files arrive as whole byte buffers. SQLite cannot open a buffer
/// directly through the stable API, so the snapshot is spooled to a private
/// temporary file and opened read-only. The spool is removed on `close()`.
pub struct SqliteSource {
    conn: Option<Connection>,
    spool: Option<NamedTempFile>,
}

impl SqliteSource {
    /// Open a database snapshot held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let mut spool = tempfile::Builder::new()
            .prefix("zmes-")
            .suffix(".sqlite")
            .tempfile()?;
        spool.write_all(bytes)?;
        spool.flush()?;

        let conn = Self::open_read_only(spool.path())?;
        log::debug!(
            "Spooled {} byte snapshot to {}",
            bytes.len(),
            spool.path().display()
        );

        Ok(Self {
            conn: Some(conn),
            spool: Some(spool),
        })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Some(conn),
            spool: None,
        }
    }

    /// True once `close()` has run
    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    fn open_read_only(path: &Path) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(path, flags)?)
    }

    fn connection(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }
}

impl QuerySource for SqliteSource {
    fn select_all(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(query)?;
        let column_count = stmt.column_count();
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .into();

        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(from_value_ref(row.get_ref(idx)?));
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(out)
    }

    fn select_scalar(&mut self, query: &str) -> Result<Option<SqlValue>, StoreError> {
        let conn = self.connection()?;
        let value = conn
            .query_row(query, [], |row| row.get_ref(0).map(from_value_ref))
            .optional()?;
        Ok(value.filter(|v| !v.is_null()))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        let result = match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, e)| StoreError::from(e)),
            None => Ok(()),
        };
        // Dropping the spool deletes the temporary copy.
        self.spool = None;
        result
    }
}

fn from_value_ref(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            SqlValue::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}
