use serde::Serialize;

use super::ParameterValue;

/// A named node of a record's parameter tree, with its decoded value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name (the type's friendly name)
    pub name: String,
    /// Parameter URN
    pub urn: String,
    /// Decoded value, absent for grouping nodes and missing data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ParameterValue>,
    /// Ordered children
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Parameter>,
}

impl Parameter {
    /// Create a parameter without value or children
    pub fn new(name: impl Into<String>, urn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urn: urn.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Set the value
    pub fn with_value(mut self, value: ParameterValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: Parameter) -> Self {
        self.children.push(child);
        self
    }

    /// True if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// First immediate child named `name`
    pub fn find_child(&self, name: &str) -> Option<&Parameter> {
        self.children.iter().find(|child| child.name == name)
    }

    /// First node named `name` in pre-order, starting with `self`
    pub fn find(&self, name: &str) -> Option<&Parameter> {
        self.walk().find(|node| node.name == name)
    }

    /// Follow a path of immediate-child names from `self`
    pub fn find_path(&self, path: &[&str]) -> Option<&Parameter> {
        path.iter()
            .try_fold(self, |node, name| node.find_child(name))
    }

    /// Pre-order iterator over this subtree, starting with `self`
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of nodes in this subtree
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Always false; a subtree has at least its root
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Drop for Parameter {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Pre-order iterator returned by [`Parameter::walk`]
pub struct Walk<'a> {
    stack: Vec<&'a Parameter>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Parameter;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
