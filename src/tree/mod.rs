pub mod adapter;
pub mod aggregate;
pub mod arena;
pub mod listeners;

use compact_str::CompactString;

use self::arena::{MapTree, NodeId};

/// Smallest value delta that triggers a value-changed notification.
pub const EPSILON: f64 = 1e-8;

/// Value of a freshly created, childless aggregation node.
pub const DEFAULT_DATA_VALUE: f64 = 0.0;

/// Errors raised while constructing tree data.
///
/// Runtime mutations (negative `set_value`, adding a child to a leaf, ...)
/// are absorbed and logged rather than reported through this type.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TreeError {
    #[error("value shall be positive, but was {value} (node '{name}')")]
    NegativeValue { name: CompactString, value: f64 },

    #[error("value must be finite, but was {value} (node '{name}')")]
    InvalidValue { name: CompactString, value: f64 },

    #[error("node {0:?} does not belong to this tree")]
    UnknownNode(NodeId),
}

/// Per-tree tuning.
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    /// Minimum change of a node's value before its listeners are notified
    pub epsilon: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { epsilon: EPSILON }
    }
}

/// Declarative description of a tree, turned into arena nodes by [`build_tree`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataSpec {
    Leaf { name: String, value: f64 },
    Node { name: String, children: Vec<DataSpec> },
}

impl DataSpec {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        DataSpec::Leaf {
            name: name.into(),
            value,
        }
    }

    pub fn node(name: impl Into<String>, children: Vec<DataSpec>) -> Self {
        DataSpec::Node {
            name: name.into(),
            children,
        }
    }
}

/// Build a `MapTree` from a `DataSpec`. Returns the tree and the id of the
/// node created for `spec` itself.
///
/// Fails on the first leaf whose value is negative or not finite.
pub fn build_tree(spec: &DataSpec) -> Result<(MapTree, NodeId), TreeError> {
    let mut tree = MapTree::new();
    let root = insert_spec(&mut tree, spec)?;

    tracing::debug!(
        "Tree built from spec: {} nodes, root '{}' = {}",
        tree.len(),
        tree.name(root),
        tree.value(root)
    );

    Ok((tree, root))
}

/// Insert `spec` into an existing tree as a detached subtree.
pub fn insert_spec(tree: &mut MapTree, spec: &DataSpec) -> Result<NodeId, TreeError> {
    match spec {
        DataSpec::Leaf { name, value } => tree.new_leaf(name.as_str(), *value),
        DataSpec::Node { name, children } => {
            let mut ids = Vec::with_capacity(children.len());
            for child in children {
                ids.push(insert_spec(tree, child)?);
            }
            Ok(tree.new_node(name.as_str(), ids))
        }
    }
}
