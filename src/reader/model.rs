use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parameters::Parameter;
use crate::schema::columns;
use crate::store::{Row, StoreError};

/// Group a record belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordGroup {
    /// Group row id
    pub id: i64,
    /// Group GUID
    pub guid: String,
    /// Display name
    pub name: Option<String>,
}

/// A record row joined with its group, before parameters are attached
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    /// Record row id
    pub id: i64,
    /// Record GUID
    pub guid: String,
    /// Root parameter type selecting the record's tree shape
    pub root_type_id: i64,
    /// Creation timestamp as written by the instrument software
    pub created_at: String,
    /// Modification timestamp as written by the instrument software
    pub modified_at: String,
    /// Joined group
    pub group: RecordGroup,
}

impl RecordRow {
    pub(super) fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.require_i64(columns::ID)?,
            guid: row.get_string(columns::GUID)?.unwrap_or_default(),
            root_type_id: row.require_i64(columns::ROOT_PARAMETER_TYPE_ID)?,
            created_at: row.get_string(columns::CREATED_AT)?.unwrap_or_default(),
            modified_at: row.get_string(columns::MODIFIED_AT)?.unwrap_or_default(),
            group: RecordGroup {
                id: row.require_i64(columns::GROUP_ID)?,
                guid: row.get_string(columns::GROUP_GUID)?.unwrap_or_default(),
                name: row.get_string(columns::GROUP_NAME)?,
            },
        })
    }
}

/// One measurement record with its populated parameter tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Record row id
    pub id: i64,
    /// Record GUID
    pub guid: String,
    /// Group this record belongs to; shared between records of one group
    pub group: Arc<RecordGroup>,
    /// Creation timestamp, verbatim
    pub created_at: String,
    /// Modification timestamp, verbatim
    pub modified_at: String,
    /// Root of the parameter tree
    pub parameters: Parameter,
}

impl Record {
    /// Combine a record row, its shared group and its parameter tree
    pub fn assemble(row: RecordRow, group: Arc<RecordGroup>, parameters: Parameter) -> Self {
        Self {
            id: row.id,
            guid: row.guid,
            group,
            created_at: row.created_at,
            modified_at: row.modified_at,
            parameters,
        }
    }

    /// Creation time, if the stored text is a recognised timestamp
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    /// Modification time, if the stored text is a recognised timestamp
    pub fn modified_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.modified_at)
    }
}

/// Parse RFC 3339 or `YYYY-MM-DD HH:MM:SS[.fff]` (taken as UTC)
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// A fully parsed export file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportFile {
    /// Schema version string
    pub schema_version: String,
    /// Key/value file metadata
    pub metadata: BTreeMap<String, String>,
    /// Records in id order
    pub records: Vec<Record>,
}

impl ExportFile {
    /// Find a record by GUID
    pub fn record_by_guid(&self, guid: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.guid == guid)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the file holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
