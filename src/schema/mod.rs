//! # Export File Schema
//!
//! Table, column and query definitions for the relational layout of an
//! export file. Every SQL statement the crate issues is declared here so the
//! loaders never embed schema names of their own.
//!
//! | Table | Role |
//! |-------|------|
//! | `SchemaInfo` | single-row schema version |
//! | `FileMetadata` | key/value file metadata |
//! | `RecordGroup` | groups that records belong to |
//! | `Record` | one row per measurement record |
//! | `ParameterType` | parameter type definitions |
//! | `ParameterTreeNode` | parent/child rows, scoped by root parameter type |
//! | `ParameterValue` | per-record typed values, with an optional blob column |

mod data_type;

pub use data_type::DataTypeCode;

/// Table names
pub mod tables {
    /// Schema version table
    pub const SCHEMA_INFO: &str = "SchemaInfo";
    /// Key/value file metadata table
    pub const FILE_METADATA: &str = "FileMetadata";
    /// Record group table
    pub const RECORD_GROUP: &str = "RecordGroup";
    /// Record table
    pub const RECORD: &str = "Record";
    /// Parameter type table
    pub const PARAMETER_TYPE: &str = "ParameterType";
    /// Parameter tree node table
    pub const PARAMETER_TREE_NODE: &str = "ParameterTreeNode";
    /// Parameter value table
    pub const PARAMETER_VALUE: &str = "ParameterValue";
}

/// Column names as returned by the queries in [`queries`]
pub mod columns {
    #![allow(missing_docs)]

    pub const VERSION: &str = "Version";
    pub const KEY: &str = "Key";
    pub const VALUE: &str = "Value";

    pub const ID: &str = "Id";
    pub const GUID: &str = "Guid";
    pub const NAME: &str = "Name";
    pub const ROOT_PARAMETER_TYPE_ID: &str = "RootParameterTypeId";
    pub const CREATED_AT: &str = "CreatedAt";
    pub const MODIFIED_AT: &str = "ModifiedAt";
    pub const GROUP_ID: &str = "GroupId";
    pub const GROUP_GUID: &str = "GroupGuid";
    pub const GROUP_NAME: &str = "GroupName";

    pub const URN: &str = "Urn";
    pub const FRIENDLY_NAME: &str = "FriendlyName";
    pub const DATA_TYPE: &str = "DataType";
    pub const DESCRIPTION: &str = "Description";
    pub const UNITS_URN: &str = "UnitsUrn";

    pub const PARAMETER_TYPE_ID: &str = "ParameterTypeId";
    pub const PARENT_ID: &str = "ParentId";
    pub const SIBLING_INDEX: &str = "SiblingIndex";

    pub const TREE_NODE_ID: &str = "TreeNodeId";
    pub const BOOLEAN_VALUE: &str = "BooleanValue";
    pub const DOUBLE_VALUE: &str = "DoubleValue";
    pub const SINGLE_VALUE: &str = "SingleValue";
    pub const INT32_VALUE: &str = "Int32Value";
    pub const INT64_VALUE: &str = "Int64Value";
    pub const TEXT_VALUE: &str = "TextValue";
    pub const BLOB_VALUE: &str = "BlobValue";
}

/// SQL statements issued against a [`QuerySource`](crate::store::QuerySource)
pub mod queries {
    /// Schema version scalar
    pub const SCHEMA_VERSION: &str = "SELECT Version FROM SchemaInfo LIMIT 1";

    /// All file metadata entries
    pub const FILE_METADATA: &str = "SELECT Key, Value FROM FileMetadata ORDER BY Key";

    /// Records joined with their group; a dangling group id keeps the record
    pub const RECORDS: &str = "SELECT r.Id, r.Guid, r.RootParameterTypeId, r.CreatedAt, r.ModifiedAt, \
         r.GroupId AS GroupId, g.Guid AS GroupGuid, g.Name AS GroupName \
         FROM Record r LEFT JOIN RecordGroup g ON g.Id = r.GroupId \
         ORDER BY r.Id";

    /// All parameter types
    pub const PARAMETER_TYPES: &str =
        "SELECT Id, Guid, Urn, FriendlyName, DataType, Description, UnitsUrn FROM ParameterType";

    /// Tree nodes for one root parameter type (`?1` = root type id)
    pub const TREE_NODES: &str = "SELECT Id, ParameterTypeId, ParentId, SiblingIndex \
         FROM ParameterTreeNode WHERE RootParameterTypeId = ?1 \
         ORDER BY SiblingIndex";

    /// Typed value columns for one record, with the data-type code of each node (`?1` = record id)
    pub const RECORD_VALUES: &str = "SELECT v.TreeNodeId, t.DataType, v.BooleanValue, v.DoubleValue, \
         v.SingleValue, v.Int32Value, v.Int64Value, v.TextValue \
         FROM ParameterValue v \
         JOIN ParameterTreeNode n ON n.Id = v.TreeNodeId \
         JOIN ParameterType t ON t.Id = n.ParameterTypeId \
         WHERE v.RecordId = ?1";

    /// Blob payloads for one record, loaded in a separate pass (`?1` = record id)
    pub const RECORD_BLOBS: &str = "SELECT TreeNodeId, BlobValue FROM ParameterValue \
         WHERE RecordId = ?1 AND BlobValue IS NOT NULL";
}
