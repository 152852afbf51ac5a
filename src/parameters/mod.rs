//! # Parameter Trees
//!
//! Export files describe each record kind as a tree of typed parameters,
//! stored as flat parent/child rows, and store each record's values in a
//! separate table of typed columns.
//!
//! Loading happens in three steps:
//!
//! 1. [`TypeRegistry::load`] reads every parameter type definition.
//! 2. [`build_tree`] links the tree-node rows of one root type into a
//!    [`TreeNode`] hierarchy with children ordered by sibling index.
//!    [`TreeCache`] keeps one tree per root type for the whole file.
//! 3. [`ValueExtractor::attach_values`] loads one record's value rows and
//!    mirrors the tree into a [`Parameter`] tree carrying decoded values.
//!
//! Structural problems are reported as [`SchemaError`]. Values that cannot be
//! interpreted (unknown data-type codes, blobs without an array region) are
//! left empty instead.

mod error;
mod parameter;
mod tree;
mod types;
mod value;

#[cfg(test)]
mod tests;

pub use error::SchemaError;
pub use parameter::{Parameter, Walk};
pub use tree::{assemble_tree, build_tree, TreeCache, TreeNode, TreeNodeRow};
pub use types::{ParameterType, TypeRegistry};
pub use value::{ParameterValue, RawValueRow, ValueExtractor};
