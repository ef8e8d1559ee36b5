use super::arena::{MapTree, NodeId, NodeKind};
use super::listeners::ValueChange;

impl MapTree {
    /// Set the value of `id`.
    ///
    /// For a leaf the value is taken as is. For a node the new total is
    /// redistributed across the children in proportion to their previous
    /// share, recursively, and the node keeps exactly `new_value`.
    ///
    /// Negative and non-finite values are ignored, as are writes to
    /// read-only nodes. Read-only children keep their value while the
    /// rest of the subtree is scaled.
    ///
    /// Ancestors are re-aggregated only while each one notifies. A change
    /// within epsilon stops the walk, so an ancestor's stored value may lag
    /// the sum of its children by up to about epsilon per child.
    pub fn set_value(&mut self, id: NodeId, new_value: f64) {
        if !new_value.is_finite() || new_value < 0.0 {
            tracing::warn!(
                "Ignoring set of an invalid value ({} for '{}')",
                new_value,
                self.name(id)
            );
            return;
        }
        if self.is_read_only(id) {
            tracing::warn!(
                "Ignoring set of value {} on read-only '{}'",
                new_value,
                self.name(id)
            );
            return;
        }

        if self.apply_value(id, new_value) {
            self.propagate_to_ancestors(id);
        }
    }

    /// Assign `new_value` to `id` and scale its subtree, without touching
    /// ancestors. Returns whether `id` notified its listeners.
    pub(crate) fn apply_value(&mut self, id: NodeId, new_value: f64) -> bool {
        let ratios: Vec<(NodeId, f64)> = match &self.get(id).kind {
            NodeKind::Leaf => Vec::new(),
            NodeKind::Node { children } => {
                // Shares are taken against the value before the update
                let current = self.get(id).value;
                children
                    .iter()
                    .filter(|&&child| !self.get(child).read_only)
                    .map(|&child| {
                        let ratio = if current < self.config.epsilon {
                            0.0
                        } else {
                            self.get(child).value / current
                        };
                        (child, ratio)
                    })
                    .collect()
            }
        };

        self.get_mut(id).value = new_value;
        for (child, ratio) in ratios {
            self.apply_value(child, new_value * ratio);
        }

        self.notify(id)
    }

    /// Recompute a node's value from its current children. No-op for leaves.
    ///
    /// Exact at the time of the call; later sub-epsilon child changes that
    /// do not notify leave the stored value behind until the next call.
    pub(crate) fn recalculate(&mut self, id: NodeId) {
        let NodeKind::Node { children } = &self.get(id).kind else {
            return;
        };
        let total: f64 = children.iter().map(|&c| self.get(c).value).sum();
        self.get_mut(id).value = total;
    }

    /// Recalculate `id` after its children changed, notify, and carry the
    /// change upwards.
    pub(crate) fn refresh_aggregate(&mut self, id: NodeId) {
        self.recalculate(id);
        if self.notify(id) {
            self.propagate_to_ancestors(id);
        }
    }

    /// Walk up from `id`, re-aggregating each parent. Stops at the first
    /// ancestor whose change stays within epsilon.
    fn propagate_to_ancestors(&mut self, id: NodeId) {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            tracing::trace!(
                "Updating '{}' after a change in a child",
                self.name(parent)
            );
            self.recalculate(parent);
            if !self.notify(parent) {
                break;
            }
            current = self.parent(parent);
        }
    }

    /// Fire value-changed on `id` if its value moved by more than epsilon
    /// since the last notification.
    fn notify(&mut self, id: NodeId) -> bool {
        let epsilon = self.config.epsilon;
        let node = self.get_mut(id);
        if (node.value - node.last_notified).abs() <= epsilon {
            return false;
        }

        node.last_notified = node.value;
        let change = ValueChange {
            node: id,
            value: node.value,
        };
        node.listeners.fire(change);
        true
    }
}
