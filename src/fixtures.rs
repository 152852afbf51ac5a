//! In-memory export files for unit tests

use rusqlite::{params, Connection};

use crate::binary;
use crate::schema::DataTypeCode;
use crate::store::SqliteSource;

pub(crate) const DDL: &str = "
CREATE TABLE SchemaInfo (Version TEXT);
CREATE TABLE FileMetadata (Key TEXT PRIMARY KEY, Value TEXT);
CREATE TABLE RecordGroup (Id INTEGER PRIMARY KEY, Guid TEXT, Name TEXT);
CREATE TABLE Record (
    Id INTEGER PRIMARY KEY, Guid TEXT, GroupId INTEGER, RootParameterTypeId INTEGER,
    CreatedAt TEXT, ModifiedAt TEXT
);
CREATE TABLE ParameterType (
    Id INTEGER PRIMARY KEY, Guid TEXT, Urn TEXT, FriendlyName TEXT, DataType INTEGER,
    Description TEXT, UnitsUrn TEXT
);
CREATE TABLE ParameterTreeNode (
    Id INTEGER PRIMARY KEY, RootParameterTypeId INTEGER, ParameterTypeId INTEGER,
    ParentId INTEGER, SiblingIndex INTEGER
);
CREATE TABLE ParameterValue (
    RecordId INTEGER, TreeNodeId INTEGER, BooleanValue INTEGER, DoubleValue REAL,
    SingleValue REAL, Int32Value INTEGER, Int64Value INTEGER, TextValue TEXT, BlobValue BLOB
);
";

/// One typed storage column of a value row
pub(crate) enum Stored<'a> {
    Boolean(bool),
    Double(f64),
    Single(f32),
    Int32(i32),
    Int64(i64),
    /// Raw integer in the 32-bit column, unchecked against its width
    Integer(i64),
    Text(&'a str),
    Array(&'a [f64]),
    Blob(&'a [u8]),
    Empty,
}

pub(crate) struct Fixture {
    pub conn: Connection,
}

impl Fixture {
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(DDL).unwrap();
        conn.execute("INSERT INTO SchemaInfo VALUES ('2.0')", []).unwrap();
        Self { conn }
    }

    pub fn metadata(self, key: &str, value: &str) -> Self {
        self.conn
            .execute("INSERT INTO FileMetadata VALUES (?1, ?2)", params![key, value])
            .unwrap();
        self
    }

    pub fn group(self, id: i64, name: Option<&str>) -> Self {
        self.conn
            .execute(
                "INSERT INTO RecordGroup VALUES (?1, ?2, ?3)",
                params![id, format!("group-{}", id), name],
            )
            .unwrap();
        self
    }

    pub fn record(self, id: i64, group_id: i64, root_type_id: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO Record VALUES (?1, ?2, ?3, ?4, '2024-03-01T10:00:00Z', '2024-03-01T10:05:00Z')",
                params![id, format!("record-{}", id), group_id, root_type_id],
            )
            .unwrap();
        self
    }

    pub fn param_type(self, id: i64, name: &str, data_type: DataTypeCode) -> Self {
        self.conn
            .execute(
                "INSERT INTO ParameterType VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL)",
                params![
                    id,
                    format!("type-{}", id),
                    format!("urn:test:{}", name.to_lowercase().replace(' ', "-")),
                    name,
                    data_type.code()
                ],
            )
            .unwrap();
        self
    }

    pub fn node(self, id: i64, root_type_id: i64, type_id: i64, parent: Option<i64>, sibling: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO ParameterTreeNode VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, root_type_id, type_id, parent, sibling],
            )
            .unwrap();
        self
    }

    pub fn value(self, record_id: i64, node_id: i64, stored: Stored<'_>) -> Self {
        let mut boolean = None;
        let mut double = None;
        let mut single = None;
        let mut int32 = None;
        let mut int64 = None;
        let mut text = None;
        let mut blob = None;
        match stored {
            Stored::Boolean(v) => boolean = Some(v as i64),
            Stored::Double(v) => double = Some(v),
            Stored::Single(v) => single = Some(f64::from(v)),
            Stored::Int32(v) => int32 = Some(i64::from(v)),
            Stored::Int64(v) => int64 = Some(v),
            Stored::Integer(v) => int32 = Some(v),
            Stored::Text(v) => text = Some(v.to_string()),
            Stored::Array(values) => blob = Some(binary::encode(values)),
            Stored::Blob(bytes) => blob = Some(bytes.to_vec()),
            Stored::Empty => {}
        }
        self.conn
            .execute(
                "INSERT INTO ParameterValue VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![record_id, node_id, boolean, double, single, int32, int64, text, blob],
            )
            .unwrap();
        self
    }

    pub fn into_source(self) -> SqliteSource {
        SqliteSource::from_connection(self.conn)
    }
}
