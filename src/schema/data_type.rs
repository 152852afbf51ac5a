use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator selecting which storage column holds a parameter's value
///
/// Codes unknown to this crate are kept as [`DataTypeCode::Unrecognized`] so
/// that files written by newer instrument software still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", from = "i64")]
pub enum DataTypeCode {
    /// Grouping node without a value of its own
    None,
    /// Tri-state boolean
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit integer that older writers store in the 32-bit column
    Int64OrInt32,
    /// IEEE-754 double
    Double,
    /// IEEE-754 single
    Single,
    /// Duration in seconds, stored as a floating point number
    Duration,
    /// Free text
    Text,
    /// GUID rendered as text
    Guid,
    /// Delimited GUID list rendered as text
    GuidList,
    /// Keys of a dictionary node, rendered as text
    DictionaryKeys,
    /// Date and time rendered as text by the writer
    DateTime,
    /// Serialized `f64` array held in the blob column
    DoubleArray,
    /// Dictionary container node
    Dictionary,
    /// Code not known to this crate
    Unrecognized(i64),
}

impl DataTypeCode {
    /// Map a stored code to its variant
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => DataTypeCode::None,
            1 => DataTypeCode::Boolean,
            2 => DataTypeCode::Int32,
            3 => DataTypeCode::Int64,
            4 => DataTypeCode::Int64OrInt32,
            5 => DataTypeCode::Double,
            6 => DataTypeCode::Single,
            7 => DataTypeCode::Duration,
            8 => DataTypeCode::Text,
            9 => DataTypeCode::Guid,
            10 => DataTypeCode::GuidList,
            11 => DataTypeCode::DictionaryKeys,
            12 => DataTypeCode::DateTime,
            13 => DataTypeCode::DoubleArray,
            14 => DataTypeCode::Dictionary,
            other => DataTypeCode::Unrecognized(other),
        }
    }

    /// The stored integer code
    pub fn code(&self) -> i64 {
        match self {
            DataTypeCode::None => 0,
            DataTypeCode::Boolean => 1,
            DataTypeCode::Int32 => 2,
            DataTypeCode::Int64 => 3,
            DataTypeCode::Int64OrInt32 => 4,
            DataTypeCode::Double => 5,
            DataTypeCode::Single => 6,
            DataTypeCode::Duration => 7,
            DataTypeCode::Text => 8,
            DataTypeCode::Guid => 9,
            DataTypeCode::GuidList => 10,
            DataTypeCode::DictionaryKeys => 11,
            DataTypeCode::DateTime => 12,
            DataTypeCode::DoubleArray => 13,
            DataTypeCode::Dictionary => 14,
            DataTypeCode::Unrecognized(code) => *code,
        }
    }

    /// True for codes whose values live in the text column
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            DataTypeCode::Text
                | DataTypeCode::Guid
                | DataTypeCode::GuidList
                | DataTypeCode::DictionaryKeys
                | DataTypeCode::DateTime
        )
    }

    /// True for codes whose values live in the blob column
    pub fn uses_blob(&self) -> bool {
        matches!(self, DataTypeCode::DoubleArray)
    }
}

impl From<i64> for DataTypeCode {
    fn from(code: i64) -> Self {
        DataTypeCode::from_code(code)
    }
}

impl From<DataTypeCode> for i64 {
    fn from(code: DataTypeCode) -> Self {
        code.code()
    }
}

impl fmt::Display for DataTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTypeCode::Unrecognized(code) => write!(f, "Unrecognized({})", code),
            other => write!(f, "{:?}", other),
        }
    }
}
