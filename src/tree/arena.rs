use compact_str::CompactString;

use super::listeners::Listeners;
use super::{TreeConfig, TreeError, DEFAULT_DATA_VALUE};

/// Index into the arena `Vec<MapNode>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a node carries its own value or aggregates its children.
/// Fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Raw value, no children
    Leaf,
    /// Value is the sum of `children`, kept in insertion order
    Node { children: Vec<NodeId> },
}

/// A single weighted item of the hierarchy, stored in the arena.
#[derive(Debug)]
pub struct MapNode {
    pub(crate) name: CompactString,
    pub(crate) kind: NodeKind,
    /// Authoritative for leaves; sum of children for nodes.
    pub(crate) value: f64,
    /// Value carried by the last notification that actually fired.
    pub(crate) last_notified: f64,
    /// Aggregating parent (None for roots and detached nodes)
    pub(crate) parent: Option<NodeId>,
    pub(crate) listeners: Listeners,
    /// Owned by a `MapDataAdapter`: public mutations are ignored
    pub(crate) read_only: bool,
}

impl MapNode {
    fn new(name: &str, kind: NodeKind, value: f64) -> Self {
        MapNode {
            name: CompactString::new(name),
            kind,
            value,
            last_notified: value,
            parent: None,
            listeners: Listeners::default(),
            read_only: false,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order. Always empty for a leaf.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Node { children } => children,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// The weighted hierarchy stored as a flat arena of nodes.
///
/// Nodes are created detached and wired together with [`MapTree::add_child`].
/// A detached node stays in the arena and can be attached again later.
#[derive(Debug, Default)]
pub struct MapTree {
    pub(crate) nodes: Vec<MapNode>,
    pub(crate) config: TreeConfig,
    pub(crate) next_listener: u64,
}

impl MapTree {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        MapTree {
            nodes: Vec::new(),
            config,
            next_listener: 0,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    fn push(&mut self, node: MapNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached leaf. Fails if `value` is negative or not finite.
    pub fn new_leaf(&mut self, name: &str, value: f64) -> Result<NodeId, TreeError> {
        if value.is_nan() || value.is_infinite() {
            return Err(TreeError::InvalidValue {
                name: CompactString::new(name),
                value,
            });
        }
        if value < 0.0 {
            return Err(TreeError::NegativeValue {
                name: CompactString::new(name),
                value,
            });
        }
        Ok(self.push(MapNode::new(name, NodeKind::Leaf, value)))
    }

    /// Create a node aggregating `children`. Its value is computed from the
    /// children straight away; no notification is fired.
    pub fn new_node(&mut self, name: &str, children: impl IntoIterator<Item = NodeId>) -> NodeId {
        let children: Vec<NodeId> = children.into_iter().collect();
        for &child in &children {
            debug_assert!(
                self.get(child).parent.is_none(),
                "node {:?} is already attached",
                child
            );
        }

        let value: f64 = children.iter().map(|&c| self.get(c).value).sum();
        let id = self.push(MapNode::new(
            name,
            NodeKind::Node {
                children: children.clone(),
            },
            value,
        ));
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        id
    }

    /// Create a node without children, valued at `DEFAULT_DATA_VALUE`.
    pub fn empty_node(&mut self, name: &str) -> NodeId {
        self.push(MapNode::new(
            name,
            NodeKind::Node {
                children: Vec::new(),
            },
            DEFAULT_DATA_VALUE,
        ))
    }

    /// Get a node by ID. Panics on an id from another tree.
    pub fn get(&self, id: NodeId) -> &MapNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut MapNode {
        &mut self.nodes[id.index()]
    }

    pub fn try_get(&self, id: NodeId) -> Result<&MapNode, TreeError> {
        self.nodes.get(id.index()).ok_or(TreeError::UnknownNode(id))
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.get(id).name()
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) {
        self.get_mut(id).name = CompactString::new(name);
    }

    pub fn value(&self, id: NodeId) -> f64 {
        self.get(id).value
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id).is_leaf()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).children()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.get(id).has_children()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    /// Whether `set_value`, `add_child` and `remove_child` ignore `id`.
    pub fn is_read_only(&self, id: NodeId) -> bool {
        self.get(id).read_only
    }

    pub(crate) fn set_read_only(&mut self, id: NodeId) {
        self.get_mut(id).read_only = true;
    }

    /// Total number of nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `ancestor` is `node` itself or one of its parents.
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).parent;
        }
        false
    }

    /// Append `child` to `parent`, recalculate and notify.
    /// Ignored (returns false) when `parent` is a leaf or read-only.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        debug_assert!(
            self.get(child).parent.is_none(),
            "node {:?} is already attached",
            child
        );
        debug_assert!(
            !self.is_ancestor_of(child, parent),
            "attaching {:?} under {:?} would create a cycle",
            child,
            parent
        );

        if self.is_leaf(parent) {
            tracing::warn!(
                "Ignoring the added child '{}' in leaf '{}'",
                self.name(child),
                self.name(parent)
            );
            return false;
        }
        if self.is_read_only(parent) {
            tracing::warn!(
                "Ignoring the added child '{}' in read-only '{}'",
                self.name(child),
                self.name(parent)
            );
            return false;
        }
        if let NodeKind::Node { children } = &mut self.get_mut(parent).kind {
            children.push(child);
        }
        self.nodes[child.index()].parent = Some(parent);

        self.refresh_aggregate(parent);
        true
    }

    /// Detach `child` from `parent`, recalculate and notify.
    /// Returns false if `child` was not one of `parent`'s children, or if
    /// `parent` is a leaf or read-only.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.is_leaf(parent) {
            tracing::warn!(
                "Ignoring removal of child '{}' from leaf '{}'",
                self.name(child),
                self.name(parent)
            );
            return false;
        }
        if self.is_read_only(parent) {
            tracing::warn!(
                "Ignoring removal of child '{}' from read-only '{}'",
                self.name(child),
                self.name(parent)
            );
            return false;
        }

        let mut removed = false;
        if let NodeKind::Node { children } = &mut self.get_mut(parent).kind {
            if let Some(pos) = children.iter().position(|&c| c == child) {
                children.remove(pos);
                removed = true;
            }
        }

        if !removed {
            tracing::debug!(
                "'{}' is not a child of '{}', nothing to remove",
                self.name(child),
                self.name(parent)
            );
            return false;
        }

        self.nodes[child.index()].parent = None;
        self.refresh_aggregate(parent);
        true
    }

    /// Iterate over `root` and all its descendants, depth-first, pre-order.
    pub fn depth_first(&self, root: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![root],
        }
    }
}

/// Pre-order walk over a subtree.
pub struct DepthFirst<'a> {
    tree: &'a MapTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Reversed so the first child is visited first
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
