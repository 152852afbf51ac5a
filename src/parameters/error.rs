use crate::store::StoreError;

/// Structural errors: the input is not a well-formed export file
///
/// These are fatal for the whole parse. Data anomalies inside well-formed
/// files (unknown data-type codes, undecodable blobs) never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A required table or column is absent or unreadable
    #[error("Missing or unreadable table {table}: {source}")]
    MissingTable {
        /// Logical table name
        table: &'static str,
        /// Underlying store failure
        source: StoreError,
    },

    /// A tree node references a parameter type that was never defined
    #[error("Tree node {node_id} references unknown parameter type {type_id}")]
    UnknownType {
        /// Offending tree node
        node_id: i64,
        /// Missing parameter type id
        type_id: i64,
    },

    /// No node without a parent exists for a root type
    #[error("No root node for root parameter type {root_type_id}")]
    NoRoot {
        /// Root parameter type being built
        root_type_id: i64,
    },

    /// More than one node without a parent exists for a root type
    #[error("{count} root nodes for root parameter type {root_type_id}")]
    MultipleRoots {
        /// Root parameter type being built
        root_type_id: i64,
        /// Number of parentless nodes found
        count: usize,
    },

    /// A node's parent id does not resolve within the same tree
    #[error("Tree node {node_id} references missing parent {parent_id}")]
    DanglingParent {
        /// Offending tree node
        node_id: i64,
        /// Parent id that did not resolve
        parent_id: i64,
    },

    /// Two rows share one tree node id
    #[error("Duplicate tree node id {0}")]
    DuplicateNode(i64),

    /// Nodes form a cycle detached from the root
    #[error("{count} tree nodes unreachable from the root of parameter type {root_type_id}")]
    Unreachable {
        /// Root parameter type being built
        root_type_id: i64,
        /// Number of nodes not reached from the root
        count: usize,
    },
}

impl SchemaError {
    pub(crate) fn table(table: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| SchemaError::MissingTable { table, source }
    }
}
