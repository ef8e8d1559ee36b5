use std::fmt;

use super::arena::{MapTree, NodeId};

/// Handle returned by [`MapTree::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Payload of a value-changed notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChange {
    /// Node whose value changed
    pub node: NodeId,
    /// Its new value (aggregate for nodes)
    pub value: f64,
}

pub type ValueListener = Box<dyn FnMut(ValueChange)>;

/// Value-changed subscribers of one node, called in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(ListenerId, ValueListener)>,
}

impl Listeners {
    fn push(&mut self, id: ListenerId, listener: ValueListener) {
        self.entries.push((id, listener));
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn fire(&mut self, change: ValueChange) {
        for (_, listener) in self.entries.iter_mut() {
            listener(change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listeners({})", self.entries.len())
    }
}

impl MapTree {
    /// Register `listener` to be called whenever `node`'s value changes by
    /// more than the tree's epsilon since the last notification.
    pub fn subscribe<F>(&mut self, node: NodeId, listener: F) -> ListenerId
    where
        F: FnMut(ValueChange) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.get_mut(node).listeners.push(id, Box::new(listener));
        id
    }

    /// Returns false if `id` was not subscribed to `node`.
    pub fn unsubscribe(&mut self, node: NodeId, id: ListenerId) -> bool {
        self.get_mut(node).listeners.remove(id)
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.get(node).listeners.len()
    }
}
