pub mod model;
pub mod rect;
pub mod sort;
pub mod squarify;

use std::collections::HashMap;

use crate::tree::arena::{MapTree, NodeId};

pub use self::model::{LayoutConfig, MapItem, MapModel};
pub use self::rect::Rect;
pub use self::squarify::{layout, layout_row, LayoutItem};

/// A positioned rectangle of the nested layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub node: NodeId,
    pub bounds: Rect,
    /// Nesting level below the layout root (root = 0)
    pub depth: u16,
}

/// The full layout result (rects + fast lookup).
#[derive(Debug, Default)]
pub struct Layout {
    /// Parents come before their children
    pub rects: Vec<LayoutRect>,
    /// node → index into `rects`
    pub node_to_rect: HashMap<NodeId, usize>,
}

impl Layout {
    pub fn rect_for(&self, node: NodeId) -> Option<&LayoutRect> {
        self.node_to_rect.get(&node).map(|&i| &self.rects[i])
    }

    /// Deepest rect containing the point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&LayoutRect> {
        // Children follow their parent and siblings never overlap, so the
        // last match is the deepest one.
        self.rects.iter().rev().find(|r| r.bounds.contains(x, y))
    }
}

/// Lay out the subtree under `root` in `(0, 0, config.width, config.height)`,
/// each node's children nested inside the node's own rectangle.
pub fn compute_layout(tree: &MapTree, root: NodeId, config: &LayoutConfig) -> Layout {
    let mut layout = Layout::default();
    let bounds = Rect::new(0.0, 0.0, config.width, config.height);

    layout.rects.push(LayoutRect {
        node: root,
        bounds,
        depth: 0,
    });
    layout.node_to_rect.insert(root, 0);

    if tree.has_children(root) {
        tracing::debug!(
            "Laying out {} children of '{}' (value {}) in {:.0}x{:.0}",
            tree.children(root).len(),
            tree.name(root),
            tree.value(root),
            bounds.w,
            bounds.h
        );
        layout_children(tree, root, bounds, 0, config, &mut layout);
    }

    layout
}

fn layout_children(
    tree: &MapTree,
    parent: NodeId,
    bounds: Rect,
    depth: u16,
    config: &LayoutConfig,
    layout: &mut Layout,
) {
    if depth >= config.max_depth {
        return;
    }

    let mut model = MapModel::new(tree, parent, bounds.w, bounds.h);
    model.layout_within(bounds);

    for item in model.items() {
        if item.bounds.area() <= 0.0 || item.bounds.area() < config.min_area {
            continue;
        }

        let child_depth = depth + 1;
        let idx = layout.rects.len();
        layout.rects.push(LayoutRect {
            node: item.node,
            bounds: item.bounds,
            depth: child_depth,
        });
        layout.node_to_rect.insert(item.node, idx);

        if tree.has_children(item.node) {
            layout_children(tree, item.node, item.bounds, child_depth, config, layout);
        }
    }
}
