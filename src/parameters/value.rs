use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::binary::ArrayDecoder;
use crate::schema::{columns, queries, tables, DataTypeCode};
use crate::store::{QuerySource, Row, SqlValue, StoreError};

use super::{Parameter, SchemaError, TreeNode};

/// A decoded parameter value
///
/// Serializes untagged, so arrays become plain JSON number sequences. JSON
/// has no NaN or infinity; such array elements are written as `null`, which
/// is why values are serialize-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Boolean value
    Boolean(bool),
    /// 32- or 64-bit integer value
    Integer(i64),
    /// Floating point value (double, single or duration)
    Real(f64),
    /// Text-like value (text, GUIDs, date-times), verbatim from the file
    Text(String),
    /// Decoded `f64` array
    Array(Vec<f64>),
}

impl ParameterValue {
    /// True for integer and real values
    pub fn is_numeric(&self) -> bool {
        matches!(self, ParameterValue::Integer(_) | ParameterValue::Real(_))
    }

    /// Numeric view of integer and real values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Integer(v) => Some(*v as f64),
            ParameterValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean view
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Array view
    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            ParameterValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            ParameterValue::Boolean(_) => "boolean",
            ParameterValue::Integer(_) => "integer",
            ParameterValue::Real(_) => "real",
            ParameterValue::Text(_) => "text",
            ParameterValue::Array(_) => "array",
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Boolean(v) => write!(f, "{}", v),
            ParameterValue::Integer(v) => write!(f, "{}", v),
            ParameterValue::Real(v) => write!(f, "{}", v),
            ParameterValue::Text(s) => write!(f, "{}", s),
            ParameterValue::Array(values) => match (values.first(), values.last()) {
                (Some(first), Some(last)) => {
                    write!(f, "[{} values: {} .. {}]", values.len(), first, last)
                }
                _ => write!(f, "[]"),
            },
        }
    }
}

/// Raw typed columns of one (record, tree node) value row
///
/// At most one column is meaningful, chosen by `data_type`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawValueRow {
    /// Tree node the value belongs to
    pub tree_node_id: i64,
    /// Data-type code of the node's parameter type
    pub data_type: Option<DataTypeCode>,
    /// Boolean column, nonzero is true
    pub boolean: Option<bool>,
    /// Double column
    pub double: Option<f64>,
    /// Single column, widened on read
    pub single: Option<f64>,
    /// 32-bit integer column, kept at full width as stored
    pub int32: Option<i64>,
    /// 64-bit integer column
    pub int64: Option<i64>,
    /// Text column
    pub text: Option<String>,
    /// Blob column, filled by the separate blob pass
    pub blob: Option<Vec<u8>>,
}

impl RawValueRow {
    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            tree_node_id: row.require_i64(columns::TREE_NODE_ID)?,
            data_type: row.get_i64(columns::DATA_TYPE)?.map(DataTypeCode::from_code),
            boolean: row.get_i64(columns::BOOLEAN_VALUE)?.map(|v| v != 0),
            double: row.get_f64(columns::DOUBLE_VALUE)?,
            single: row.get_f64(columns::SINGLE_VALUE)?,
            int32: row.get_i64(columns::INT32_VALUE)?,
            int64: row.get_i64(columns::INT64_VALUE)?,
            text: row.get(columns::TEXT_VALUE)?.as_str().map(str::to_string),
            blob: None,
        })
    }
}

/// Attaches decoded values to a parameter tree, one record at a time
#[derive(Debug, Clone)]
pub struct ValueExtractor {
    decoder: ArrayDecoder,
    load_blobs: bool,
}

impl Default for ValueExtractor {
    fn default() -> Self {
        Self {
            decoder: ArrayDecoder::default(),
            load_blobs: true,
        }
    }
}

impl ValueExtractor {
    /// Extractor with the default array decoder, loading blobs
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different array decoder
    pub fn with_decoder(mut self, decoder: ArrayDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Enable or disable the blob pass
    ///
    /// Without blobs, array parameters carry no value.
    pub fn with_blobs(mut self, load_blobs: bool) -> Self {
        self.load_blobs = load_blobs;
        self
    }

    /// Load the raw value rows of `record_id`, keyed by tree-node id
    pub fn load_rows<S: QuerySource + ?Sized>(
        &self,
        source: &mut S,
        record_id: i64,
    ) -> Result<HashMap<i64, RawValueRow>, SchemaError> {
        let params = [SqlValue::Integer(record_id)];
        let rows = source
            .select_all(queries::RECORD_VALUES, &params)
            .map_err(SchemaError::table(tables::PARAMETER_VALUE))?;

        let mut by_node = HashMap::with_capacity(rows.len());
        for row in &rows {
            let raw =
                RawValueRow::from_row(row).map_err(SchemaError::table(tables::PARAMETER_VALUE))?;
            by_node.insert(raw.tree_node_id, raw);
        }

        if self.load_blobs {
            let blobs = source
                .select_all(queries::RECORD_BLOBS, &params)
                .map_err(SchemaError::table(tables::PARAMETER_VALUE))?;
            for row in &blobs {
                let node_id = row
                    .require_i64(columns::TREE_NODE_ID)
                    .map_err(SchemaError::table(tables::PARAMETER_VALUE))?;
                let blob = row
                    .get_blob(columns::BLOB_VALUE)
                    .map_err(SchemaError::table(tables::PARAMETER_VALUE))?;
                match by_node.get_mut(&node_id) {
                    Some(raw) => raw.blob = blob,
                    None => log::debug!(
                        "Record {}: blob for tree node {} has no value row",
                        record_id,
                        node_id
                    ),
                }
            }
        }

        Ok(by_node)
    }

    /// Load the values of `record_id` and attach them to a copy of `tree`
    pub fn attach_values<S: QuerySource + ?Sized>(
        &self,
        source: &mut S,
        record_id: i64,
        tree: &TreeNode,
    ) -> Result<Parameter, SchemaError> {
        let rows = self.load_rows(source, record_id)?;
        let mut unrecognized = HashSet::new();
        let root = self.populate(tree, &rows, &mut unrecognized);
        if !unrecognized.is_empty() {
            let mut codes: Vec<_> = unrecognized.into_iter().collect();
            codes.sort_unstable();
            log::warn!(
                "Record {}: ignored values with unrecognized data-type codes {:?}",
                record_id,
                codes
            );
        }
        Ok(root)
    }

    /// Mirror `tree` into a value-bearing parameter tree
    pub(crate) fn populate(
        &self,
        tree: &TreeNode,
        rows: &HashMap<i64, RawValueRow>,
        unrecognized: &mut HashSet<i64>,
    ) -> Parameter {
        let mut current = (tree.children.iter(), self.node_value(tree, rows, unrecognized));
        let mut ancestors = Vec::new();
        loop {
            if let Some(child) = current.0.next() {
                let frame = (child.children.iter(), self.node_value(child, rows, unrecognized));
                ancestors.push(std::mem::replace(&mut current, frame));
                continue;
            }
            let (_, parameter) = current;
            match ancestors.pop() {
                Some(mut parent) => {
                    parent.1.children.push(parameter);
                    current = parent;
                }
                None => return parameter,
            }
        }
    }

    /// Childless parameter for `node` with its value, if any
    fn node_value(
        &self,
        node: &TreeNode,
        rows: &HashMap<i64, RawValueRow>,
        unrecognized: &mut HashSet<i64>,
    ) -> Parameter {
        let value = rows.get(&node.id).and_then(|raw| {
            let data_type = raw.data_type.unwrap_or(node.parameter_type.data_type);
            if let DataTypeCode::Unrecognized(code) = data_type {
                unrecognized.insert(code);
            }
            self.extract(data_type, raw)
        });

        Parameter {
            name: node.parameter_type.friendly_name.clone(),
            urn: node.parameter_type.urn.clone(),
            value,
            children: Vec::with_capacity(node.children.len()),
        }
    }

    /// Pick and decode the column selected by `data_type`
    pub fn extract(&self, data_type: DataTypeCode, raw: &RawValueRow) -> Option<ParameterValue> {
        match data_type {
            DataTypeCode::None | DataTypeCode::Dictionary => None,
            DataTypeCode::Boolean => raw.boolean.map(ParameterValue::Boolean),
            DataTypeCode::Int32 => raw.int32.map(ParameterValue::Integer),
            DataTypeCode::Int64 => raw.int64.map(ParameterValue::Integer),
            DataTypeCode::Int64OrInt32 => raw
                .int64
                .or(raw.int32)
                .map(ParameterValue::Integer),
            DataTypeCode::Double | DataTypeCode::Single | DataTypeCode::Duration => {
                raw.double.or(raw.single).map(ParameterValue::Real)
            }
            code if code.is_text() => raw.text.clone().map(ParameterValue::Text),
            DataTypeCode::DoubleArray => raw
                .blob
                .as_deref()
                .map(|blob| ParameterValue::Array(self.decoder.decode(blob))),
            _ => None,
        }
    }
}
