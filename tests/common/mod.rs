//! Writes small export files to disk for integration tests

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use rusqlite::{params, Connection};
use std::path::Path;

use zmes::binary::ELEMENT_MARKER;
use zmes::schema::DataTypeCode;

const DDL: &str = "
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

/// Encode values the way the instrument software does: some header bytes,
/// then marker + little-endian double per element
pub fn encode_array(values: &[f64]) -> Vec<u8> {
    let mut blob = vec![0x01, 0x00, 0x00, 0x00, 0xFF];
    for &value in values {
        blob.extend_from_slice(&ELEMENT_MARKER);
        blob.write_f64::<LittleEndian>(value).unwrap();
    }
    blob
}

/// Log-spaced size classes from 0.3 to 10000 nm
pub fn size_classes(count: usize) -> Vec<f64> {
    let (lo, hi) = (0.3f64, 10000.0f64);
    (0..count)
        .map(|i| lo * (hi / lo).powf(i as f64 / (count - 1) as f64))
        .collect()
}

// Node ids of the DLS tree shape written by `dls_export`
pub const ROOT_TYPE: i64 = 1;
pub const SAMPLE_NAME_NODE: i64 = 11;
pub const START_NODE: i64 = 12;
pub const TEMPERATURE_NODE: i64 = 21;
pub const RUNS_NODE: i64 = 22;
pub const MODEL_NODE: i64 = 23;
pub const SIZES_NODE: i64 = 31;
pub const INTENSITY_NODE: i64 = 32;
pub const VOLUME_NODE: i64 = 33;
pub const Z_AVERAGE_NODE: i64 = 34;

pub struct ExportWriter {
    conn: Connection,
}

impl ExportWriter {
    pub fn create(path: &Path) -> Self {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(DDL).unwrap();
        conn.execute("INSERT INTO SchemaInfo VALUES ('3.1')", []).unwrap();
        conn.execute(
            "INSERT INTO FileMetadata VALUES ('Software Version', '8.02')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO RecordGroup VALUES (1, 'g-1', 'Latex standards')", [])
            .unwrap();
        Self { conn }
    }

    /// Parameter types and the tree shape of a DLS size record
    pub fn dls_export(path: &Path) -> Self {
        let writer = Self::create(path);
        let types: &[(i64, &str, DataTypeCode)] = &[
            (1, "Size Record", DataTypeCode::None),
            (2, "Sample Name", DataTypeCode::Text),
            (3, "Measurement Start Date And Time", DataTypeCode::DateTime),
            (4, "Settings", DataTypeCode::Dictionary),
            (5, "Temperature", DataTypeCode::Double),
            (6, "Number Of Runs", DataTypeCode::Int32),
            (7, "Analysis Model", DataTypeCode::Text),
            (8, "Result", DataTypeCode::None),
            (9, "Sizes", DataTypeCode::DoubleArray),
            (10, "Intensity Distribution", DataTypeCode::DoubleArray),
            (11, "Volume Distribution", DataTypeCode::DoubleArray),
            (12, "Z-Average", DataTypeCode::Single),
        ];
        for &(id, name, code) in types {
            writer
                .conn
                .execute(
                    "INSERT INTO ParameterType VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL)",
                    params![
                        id,
                        format!("00000000-0000-0000-0000-{:012}", id),
                        format!("urn:dls:{}", name.to_lowercase().replace(' ', "-")),
                        name,
                        code.code()
                    ],
                )
                .unwrap();
        }

        // (id, type, parent, sibling); inserted out of order on purpose
        let nodes: &[(i64, i64, Option<i64>, i64)] = &[
            (30, 8, Some(10), 2),
            (SIZES_NODE, 9, Some(30), 0),
            (VOLUME_NODE, 11, Some(30), 2),
            (INTENSITY_NODE, 10, Some(30), 1),
            (Z_AVERAGE_NODE, 12, Some(30), 3),
            (10, 1, None, 0),
            (SAMPLE_NAME_NODE, 2, Some(10), 0),
            (20, 4, Some(10), 1),
            (TEMPERATURE_NODE, 5, Some(20), 0),
            (RUNS_NODE, 6, Some(20), 1),
            (MODEL_NODE, 7, Some(20), 2),
            (START_NODE, 3, Some(10), 3),
        ];
        for &(id, type_id, parent, sibling) in nodes {
            writer
                .conn
                .execute(
                    "INSERT INTO ParameterTreeNode VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![id, ROOT_TYPE, type_id, parent, sibling],
                )
                .unwrap();
        }
        writer
    }

    pub fn record(self, id: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO Record VALUES (?1, ?2, 1, ?3, '2024-05-02 09:30:00.125', '2024-05-02 09:31:00')",
                params![id, format!("rec-{}", id), ROOT_TYPE],
            )
            .unwrap();
        self
    }

    pub fn text(self, record: i64, node: i64, value: &str) -> Self {
        self.insert(record, node, "TextValue", rusqlite::types::Value::Text(value.into()))
    }

    pub fn double(self, record: i64, node: i64, value: f64) -> Self {
        self.insert(record, node, "DoubleValue", rusqlite::types::Value::Real(value))
    }

    pub fn single(self, record: i64, node: i64, value: f32) -> Self {
        self.insert(record, node, "SingleValue", rusqlite::types::Value::Real(f64::from(value)))
    }

    pub fn int32(self, record: i64, node: i64, value: i32) -> Self {
        self.insert(record, node, "Int32Value", rusqlite::types::Value::Integer(i64::from(value)))
    }

    pub fn array(self, record: i64, node: i64, values: &[f64]) -> Self {
        self.insert(record, node, "BlobValue", rusqlite::types::Value::Blob(encode_array(values)))
    }

    fn insert(self, record: i64, node: i64, column: &str, value: rusqlite::types::Value) -> Self {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO ParameterValue (RecordId, TreeNodeId, {}) VALUES (?1, ?2, ?3)",
                    column
                ),
                params![record, node, value],
            )
            .unwrap();
        self
    }

    /// A record with every field the default projection reads
    pub fn full_record(self, id: i64, name: &str) -> Self {
        let sizes = size_classes(70);
        let intensity: Vec<f64> = (0..70).map(|i| (i as f64 - 35.0).abs()).collect();
        let volume: Vec<f64> = (0..70).map(|i| i as f64 / 70.0).collect();
        self.record(id)
            .text(id, SAMPLE_NAME_NODE, name)
            .text(id, START_NODE, "2024-05-02 09:30:00")
            .double(id, TEMPERATURE_NODE, 25.0)
            .int32(id, RUNS_NODE, 13)
            .text(id, MODEL_NODE, "General Purpose")
            .array(id, SIZES_NODE, &sizes)
            .array(id, INTENSITY_NODE, &intensity)
            .array(id, VOLUME_NODE, &volume)
            .single(id, Z_AVERAGE_NODE, 61.25)
    }

    pub fn finish(self) {
        self.conn.close().map_err(|(_, e)| e).unwrap();
    }
}
