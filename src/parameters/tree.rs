use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::schema::{columns, queries, tables};
use crate::store::{QuerySource, Row, SqlValue, StoreError};

use super::{ParameterType, SchemaError, TypeRegistry};

/// Flat tree-node row as stored in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNodeRow {
    /// Node id
    pub id: i64,
    /// Referenced parameter type
    pub parameter_type_id: i64,
    /// Parent node, `None` for the root
    pub parent_id: Option<i64>,
    /// Ordering key among siblings
    pub sibling_index: i64,
}

impl TreeNodeRow {
    fn from_row(row: &Row) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.require_i64(columns::ID)?,
            parameter_type_id: row.require_i64(columns::PARAMETER_TYPE_ID)?,
            parent_id: row.get_i64(columns::PARENT_ID)?,
            sibling_index: row.get_i64(columns::SIBLING_INDEX)?.unwrap_or(0),
        })
    }
}

/// A node of the parameter schema tree, before values are attached
///
/// Children are always ordered by ascending sibling index.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Node id; the key value rows are attached by
    pub id: i64,
    /// Resolved parameter type
    pub parameter_type: Arc<ParameterType>,
    /// Parent node, `None` for the root
    pub parent_id: Option<i64>,
    /// Ordering key among siblings
    pub sibling_index: i64,
    /// Ordered children
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Parameter name of this node
    pub fn name(&self) -> &str {
        &self.parameter_type.friendly_name
    }

    /// Number of nodes in this subtree, including `self`
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Always false; a tree has at least its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Node ids in pre-order
    pub fn preorder_ids(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(self.len());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.id);
            stack.extend(node.children.iter().rev());
        }
        ids
    }
}

impl Drop for TreeNode {
    // Flattened so that deep chains do not recurse through the drop glue
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Load and assemble the tree for one root parameter type
pub fn build_tree<S: QuerySource + ?Sized>(
    source: &mut S,
    registry: &TypeRegistry,
    root_type_id: i64,
) -> Result<TreeNode, SchemaError> {
    let rows = source
        .select_all(queries::TREE_NODES, &[SqlValue::Integer(root_type_id)])
        .map_err(SchemaError::table(tables::PARAMETER_TREE_NODE))?;

    let rows = rows
        .iter()
        .map(TreeNodeRow::from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(SchemaError::table(tables::PARAMETER_TREE_NODE))?;

    assemble_tree(root_type_id, rows, registry)
}

/// Link flat rows into a single ordered tree
///
/// Fails if a type does not resolve, if there is not exactly one parentless
/// node, if a parent id does not resolve, or if some nodes are not reachable
/// from the root.
pub fn assemble_tree(
    root_type_id: i64,
    rows: Vec<TreeNodeRow>,
    registry: &TypeRegistry,
) -> Result<TreeNode, SchemaError> {
    let mut ids = HashSet::with_capacity(rows.len());
    for row in &rows {
        if registry.get(row.parameter_type_id).is_none() {
            return Err(SchemaError::UnknownType {
                node_id: row.id,
                type_id: row.parameter_type_id,
            });
        }
        if !ids.insert(row.id) {
            return Err(SchemaError::DuplicateNode(row.id));
        }
    }

    let total = rows.len();
    let mut roots = Vec::new();
    let mut children: HashMap<i64, Vec<TreeNodeRow>> = HashMap::new();
    for row in rows {
        match row.parent_id {
            None => roots.push(row),
            Some(parent_id) if !ids.contains(&parent_id) => {
                return Err(SchemaError::DanglingParent {
                    node_id: row.id,
                    parent_id,
                });
            }
            Some(parent_id) => children.entry(parent_id).or_default().push(row),
        }
    }

    let root = match roots.len() {
        0 => return Err(SchemaError::NoRoot { root_type_id }),
        1 => roots.remove(0),
        count => return Err(SchemaError::MultipleRoots { root_type_id, count }),
    };

    for siblings in children.values_mut() {
        siblings.sort_by_key(|row| (row.sibling_index, row.id));
    }

    let tree = link(root, &mut children, registry)?;
    let reached = tree.len();
    if reached != total {
        return Err(SchemaError::Unreachable {
            root_type_id,
            count: total - reached,
        });
    }

    log::debug!(
        "Built parameter tree for root type {} ({} nodes)",
        root_type_id,
        reached
    );
    Ok(tree)
}

/// A node whose children are still being linked
struct LinkFrame {
    row: TreeNodeRow,
    parameter_type: Arc<ParameterType>,
    pending: std::vec::IntoIter<TreeNodeRow>,
    children: Vec<TreeNode>,
}

impl LinkFrame {
    fn open(
        row: TreeNodeRow,
        pending: &mut HashMap<i64, Vec<TreeNodeRow>>,
        registry: &TypeRegistry,
    ) -> Result<Self, SchemaError> {
        let parameter_type = registry
            .get(row.parameter_type_id)
            .cloned()
            .ok_or(SchemaError::UnknownType {
                node_id: row.id,
                type_id: row.parameter_type_id,
            })?;
        let child_rows = pending.remove(&row.id).unwrap_or_default();
        Ok(Self {
            row,
            parameter_type,
            children: Vec::with_capacity(child_rows.len()),
            pending: child_rows.into_iter(),
        })
    }

    fn finish(self) -> TreeNode {
        TreeNode {
            id: self.row.id,
            parameter_type: self.parameter_type,
            parent_id: self.row.parent_id,
            sibling_index: self.row.sibling_index,
            children: self.children,
        }
    }
}

/// Depth-first linking with an explicit stack of open ancestors
fn link(
    root: TreeNodeRow,
    pending: &mut HashMap<i64, Vec<TreeNodeRow>>,
    registry: &TypeRegistry,
) -> Result<TreeNode, SchemaError> {
    let mut current = LinkFrame::open(root, pending, registry)?;
    let mut ancestors: Vec<LinkFrame> = Vec::new();
    loop {
        if let Some(row) = current.pending.next() {
            let child = LinkFrame::open(row, pending, registry)?;
            ancestors.push(std::mem::replace(&mut current, child));
            continue;
        }
        let node = current.finish();
        match ancestors.pop() {
            Some(mut parent) => {
                parent.children.push(node);
                current = parent;
            }
            None => return Ok(node),
        }
    }
}

/// Built trees keyed by root parameter type id
///
/// Records of the same kind share one tree shape, so each distinct root type
/// is loaded once per file.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: HashMap<i64, Arc<TreeNode>>,
}

impl TreeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached tree for `root_type_id`, building it on first use
    pub fn get_or_build<S: QuerySource + ?Sized>(
        &mut self,
        source: &mut S,
        registry: &TypeRegistry,
        root_type_id: i64,
    ) -> Result<Arc<TreeNode>, SchemaError> {
        if let Some(tree) = self.trees.get(&root_type_id) {
            log::debug!("Reusing parameter tree for root type {}", root_type_id);
            return Ok(Arc::clone(tree));
        }
        let tree = Arc::new(build_tree(source, registry, root_type_id)?);
        self.trees.insert(root_type_id, Arc::clone(&tree));
        Ok(tree)
    }

    /// Number of distinct trees built
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// True if nothing has been built yet
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
