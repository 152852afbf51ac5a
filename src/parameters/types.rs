use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::{columns, queries, tables, DataTypeCode};
use crate::store::{QuerySource, Row, StoreError};

use super::SchemaError;

/// Definition of a parameter: its name, identity and storage data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterType {
    /// Row id, referenced by tree nodes
    pub id: i64,
    /// Stable GUID
    pub guid: String,
    /// Uniform resource name
    pub urn: String,
    /// Display name; the key used by name-based tree search
    pub friendly_name: String,
    /// Storage data type
    pub data_type: DataTypeCode,
    /// Free-form description
    pub description: Option<String>,
    /// URN of the value's units
    pub units_urn: Option<String>,
}

impl ParameterType {
    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.require_i64(columns::ID)?,
            guid: row.get_string(columns::GUID)?.unwrap_or_default(),
            urn: row.get_string(columns::URN)?.unwrap_or_default(),
            friendly_name: row.get_string(columns::FRIENDLY_NAME)?.unwrap_or_default(),
            data_type: DataTypeCode::from_code(row.get_i64(columns::DATA_TYPE)?.unwrap_or(0)),
            description: row.get_string(columns::DESCRIPTION)?,
            units_urn: row.get_string(columns::UNITS_URN)?,
        })
    }
}

/// In-memory lookup of every parameter type in a file, keyed by id
///
/// Types are shared (`Arc`) with the tree nodes that reference them.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<i64, Arc<ParameterType>>,
}

impl TypeRegistry {
    /// Load all parameter types from the store
    pub fn load<S: QuerySource + ?Sized>(source: &mut S) -> Result<Self, SchemaError> {
        let rows = source
            .select_all(queries::PARAMETER_TYPES, &[])
            .map_err(SchemaError::table(tables::PARAMETER_TYPE))?;

        let types = rows
            .iter()
            .map(ParameterType::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(SchemaError::table(tables::PARAMETER_TYPE))?;

        log::debug!("Loaded {} parameter types", types.len());
        Ok(Self::from_types(types))
    }

    /// Build a registry from already-loaded types
    pub fn from_types(types: impl IntoIterator<Item = ParameterType>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.id, Arc::new(t))).collect(),
        }
    }

    /// Look a type up by id
    pub fn get(&self, id: i64) -> Option<&Arc<ParameterType>> {
        self.types.get(&id)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all types in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &ParameterType> {
        self.types.values().map(|t| t.as_ref())
    }
}
