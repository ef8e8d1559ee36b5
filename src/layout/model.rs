use crate::tree::arena::{MapTree, NodeId};

use super::rect::Rect;
use super::squarify::{self, LayoutItem};

/// Default available area, used until the presentation layer reports its size.
pub const DEFAULT_WIDTH: f64 = 1200.0;
pub const DEFAULT_HEIGHT: f64 = 800.0;

/// Configuration for treemap layout.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Available width (px)
    pub width: f64,
    /// Available height (px)
    pub height: f64,
    /// Minimum area (px²) for a rect to be emitted by `compute_layout`
    pub min_area: f64,
    /// Maximum nesting depth followed by `compute_layout`
    pub max_depth: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_area: 0.0,
            max_depth: 64,
        }
    }
}

/// One child of the displayed node, scaled to pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MapItem {
    pub node: NodeId,
    /// Value of the node when the model was (re)built
    pub value: f64,
    /// Share of the parent total, in 0..=1
    pub percentage: f64,
    /// Target area in px²
    pub size: f64,
    pub bounds: Rect,
}

impl LayoutItem for MapItem {
    fn size(&self) -> f64 {
        self.size
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }
}

/// Bridge between a node of the tree and the squarifier: turns the node's
/// children into `MapItem`s sized against the available area.
///
/// The model is a snapshot; call [`MapModel::refresh`] after the tree changes.
#[derive(Debug, Clone)]
pub struct MapModel {
    node: NodeId,
    total: f64,
    width: f64,
    height: f64,
    items: Vec<MapItem>,
}

impl MapModel {
    pub fn new(tree: &MapTree, node: NodeId, width: f64, height: f64) -> Self {
        let mut model = MapModel {
            node,
            total: 0.0,
            width,
            height,
            items: Vec::new(),
        };
        model.refresh(tree);
        model
    }

    pub fn with_config(tree: &MapTree, node: NodeId, config: &LayoutConfig) -> Self {
        Self::new(tree, node, config.width, config.height)
    }

    /// Re-read the children of the displayed node and their values.
    /// Previously computed bounds are discarded.
    pub fn refresh(&mut self, tree: &MapTree) {
        self.total = tree.value(self.node);
        self.items = tree
            .children(self.node)
            .iter()
            .map(|&child| MapItem {
                node: child,
                value: tree.value(child),
                percentage: 0.0,
                size: 0.0,
                bounds: Rect::default(),
            })
            .collect();
        self.rescale();
    }

    /// Change the available area. Item sizes follow; call `layout` again.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.rescale();
    }

    fn rescale(&mut self) {
        let total_area = self.total_area();
        let total = self.total;
        for item in &mut self.items {
            item.percentage = if total > 0.0 { item.value / total } else { 0.0 };
            item.size = item.percentage * total_area;
        }
    }

    /// Squarify the items into `(0, 0, width, height)`.
    pub fn layout(&mut self) {
        let bounds = Rect::new(0.0, 0.0, self.width, self.height);
        self.layout_within(bounds);
    }

    /// Squarify the items into `bounds`, resizing the model to match.
    pub fn layout_within(&mut self, bounds: Rect) {
        self.set_size(bounds.w, bounds.h);

        let total_size = squarify::total_size(&self.items);
        if self.items.is_empty() || !(total_size > 0.0) {
            tracing::debug!(
                "Nothing to lay out for {:?} (total value {}, area {:.0})",
                self.node,
                self.total,
                self.total_area()
            );
            for item in &mut self.items {
                item.bounds = Rect::new(bounds.x, bounds.y, 0.0, 0.0);
            }
            return;
        }

        squarify::layout(&mut self.items, bounds);
    }

    /// The node whose children are displayed.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Value of the displayed node when the model was (re)built.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn total_area(&self) -> f64 {
        self.width * self.height
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Items in child insertion order.
    pub fn items(&self) -> &[MapItem] {
        &self.items
    }

    pub fn item_for(&self, node: NodeId) -> Option<&MapItem> {
        self.items.iter().find(|item| item.node == node)
    }

    /// Item under the point, if any.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&MapItem> {
        self.items.iter().find(|item| item.bounds.contains(x, y))
    }
}
