use super::arena::{MapTree, NodeId};
use super::TreeError;

pub type ValueFn<T> = Box<dyn Fn(&T) -> f64>;

/// Exposes a list of domain objects as a node of the tree, one leaf per object.
///
/// Leaf values are derived from the objects through a value function; call
/// [`MapDataAdapter::update`] after the objects (or the function) change.
///
/// The node and its leaves are read-only: `MapTree::set_value`,
/// `add_child` and `remove_child` ignore them, only `update` writes.
pub struct MapDataAdapter<T> {
    node: NodeId,
    objects: Vec<T>,
    leaves: Vec<NodeId>,
    value_fn: ValueFn<T>,
}

impl<T> MapDataAdapter<T> {
    pub fn new<V, N>(
        tree: &mut MapTree,
        name: &str,
        objects: Vec<T>,
        value_fn: V,
        name_fn: N,
    ) -> Result<Self, TreeError>
    where
        V: Fn(&T) -> f64 + 'static,
        N: Fn(&T) -> String,
    {
        let mut leaves = Vec::with_capacity(objects.len());
        for object in &objects {
            let leaf_name = name_fn(object);
            let value = usable_value(&leaf_name, value_fn(object));
            leaves.push(tree.new_leaf(&leaf_name, value)?);
        }
        let node = tree.new_node(name, leaves.iter().copied());
        tree.set_read_only(node);
        for &leaf in &leaves {
            tree.set_read_only(leaf);
        }

        tracing::debug!(
            "Adapted {} objects into '{}' (total {})",
            objects.len(),
            name,
            tree.value(node)
        );

        Ok(MapDataAdapter {
            node,
            objects,
            leaves,
            value_fn: Box::new(value_fn),
        })
    }

    /// The aggregation node holding one leaf per object.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Mutable access to the objects. Values are re-read on the next `update`.
    pub fn objects_mut(&mut self) -> &mut [T] {
        &mut self.objects
    }

    /// Leaf created for the object at `index`.
    pub fn leaf_for(&self, index: usize) -> Option<NodeId> {
        self.leaves.get(index).copied()
    }

    /// Re-evaluate the value function for every object.
    ///
    /// Changed leaves notify individually; the adapter node re-aggregates
    /// once at the end.
    pub fn update(&self, tree: &mut MapTree) {
        for (object, &leaf) in self.objects.iter().zip(&self.leaves) {
            let value = usable_value(tree.name(leaf), (self.value_fn)(object));
            tree.apply_value(leaf, value);
        }
        tree.refresh_aggregate(self.node);
    }

    /// Swap the value function and update the leaves.
    pub fn set_value_function<V>(&mut self, tree: &mut MapTree, value_fn: V)
    where
        V: Fn(&T) -> f64 + 'static,
    {
        self.value_fn = Box::new(value_fn);
        self.update(tree);
    }
}

/// Clamp values the tree would reject to 0.
fn usable_value(name: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!("Value function returned {} for '{}', using 0", value, name);
        0.0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::tree::EPSILON;

    struct Country {
        name: &'static str,
        area: f64,
        population: f64,
    }

    fn benelux() -> Vec<Country> {
        vec![
            Country {
                name: "Belgium",
                area: 30510.0,
                population: 1100702.0,
            },
            Country {
                name: "Luxembourg",
                area: 2586.0,
                population: 512000.0,
            },
            Country {
                name: "Netherlands",
                area: 41526.0,
                population: 17144600.0,
            },
        ]
    }

    #[test]
    fn adapter_builds_one_leaf_per_object() {
        let mut tree = MapTree::new();
        let adapter = MapDataAdapter::new(
            &mut tree,
            "Benelux",
            benelux(),
            |c: &Country| c.area,
            |c: &Country| c.name.to_string(),
        )
        .unwrap();

        let node = adapter.node();
        assert_eq!(tree.name(node), "Benelux");
        assert_eq!(tree.children(node).len(), 3);
        assert!((tree.value(node) - 74622.0).abs() < EPSILON);

        let lux = adapter.leaf_for(1).unwrap();
        assert_eq!(tree.name(lux), "Luxembourg");
        assert_eq!(tree.value(lux), 2586.0);
        assert!(adapter.leaf_for(3).is_none());
    }

    #[test]
    fn switching_value_function_updates_and_notifies_once() {
        let mut tree = MapTree::new();
        let mut adapter = MapDataAdapter::new(
            &mut tree,
            "Benelux",
            benelux(),
            |c: &Country| c.area,
            |c: &Country| c.name.to_string(),
        )
        .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        tree.subscribe(adapter.node(), move |change| sink.borrow_mut().push(change.value));

        adapter.set_value_function(&mut tree, |c: &Country| c.population);
        assert!((tree.value(adapter.node()) - 18757302.0).abs() < EPSILON);
        assert_eq!(*seen.borrow(), vec![18757302.0]);
    }

    #[test]
    fn adapter_subtree_rejects_outside_mutation() {
        let mut tree = MapTree::new();
        let mut adapter = MapDataAdapter::new(
            &mut tree,
            "Benelux",
            benelux(),
            |c: &Country| c.area,
            |c: &Country| c.name.to_string(),
        )
        .unwrap();
        let node = adapter.node();
        let belgium = adapter.leaf_for(0).unwrap();
        let lux = adapter.leaf_for(1).unwrap();
        let children = tree.children(node).to_vec();
        let extra = tree.new_leaf("extra", 50.0).unwrap();

        tree.set_value(belgium, 100.0);
        tree.set_value(node, 1.0);
        assert!(!tree.add_child(node, extra));
        assert!(!tree.remove_child(node, lux));

        assert_eq!(tree.value(belgium), 30510.0);
        assert_eq!(tree.children(node), children.as_slice());
        assert_eq!(tree.parent(lux), Some(node));
        assert_eq!(tree.parent(extra), None);
        assert!((tree.value(node) - 74622.0).abs() < EPSILON);

        // The adapter itself still writes through
        adapter.objects_mut()[0].area = 100.0;
        adapter.update(&mut tree);
        assert_eq!(tree.value(belgium), 100.0);
        assert_eq!(tree.children(node).len(), 3);
        assert!((tree.value(node) - 44212.0).abs() < EPSILON);
    }

    #[test]
    fn update_picks_up_object_changes_and_clamps_bad_values() {
        let mut tree = MapTree::new();
        let mut adapter = MapDataAdapter::new(
            &mut tree,
            "Benelux",
            benelux(),
            |c: &Country| c.area,
            |c: &Country| c.name.to_string(),
        )
        .unwrap();

        adapter.objects_mut()[0].area = -5.0;
        adapter.objects_mut()[2].area = 1000.0;
        adapter.update(&mut tree);

        assert_eq!(tree.value(adapter.leaf_for(0).unwrap()), 0.0);
        assert!((tree.value(adapter.node()) - 3586.0).abs() < EPSILON);
    }
}
