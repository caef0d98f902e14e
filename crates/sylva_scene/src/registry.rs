use slotmap::SparseSecondaryMap;
use sylva_core::{EntityId, TransformStore};

use crate::node::SceneNode;

/// Owns every [`SceneNode`] and the list of root entities.
///
/// # Invariants
///
/// - `roots` holds exactly the registered entities without a parent, once each.
/// - A node's parent is registered and lists the node exactly once among its
///   children.
#[derive(Debug, Clone, Default)]
pub struct SceneNodeRegistry {
    nodes: SparseSecondaryMap<EntityId, SceneNode>,
    roots: Vec<EntityId>,
}

impl SceneNodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` as a root. Returns `false` if it was already registered.
    pub fn register(&mut self, id: EntityId, index: Option<usize>) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        self.nodes.insert(id, SceneNode::new(id, index));
        self.roots.push(id);
        true
    }

    /// Removes `id`, promoting its children to roots.
    ///
    /// The children keep their local transforms; their world transforms change
    /// because their ancestor chain did.
    pub fn unregister(&mut self, id: EntityId) -> Option<SceneNode> {
        let children = std::mem::take(&mut self.nodes.get_mut(id)?.children);
        for &child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
                self.roots.push(child);
            }
        }

        self.unlink(id);
        let mut node = self.nodes.remove(id)?;
        node.children = children;
        Some(node)
    }

    /// Re-reads every cached slot index from `store`.
    pub fn refresh_indices<S: TransformStore + ?Sized>(&mut self, store: &S) {
        for (id, node) in &mut self.nodes {
            node.index = store.index_of(id);
        }
    }

    /// Detaches `child` from its parent's child list, or from the root list.
    /// The node is left without a parent and outside the root list.
    pub(crate) fn unlink(&mut self, child: EntityId) {
        let Some(node) = self.nodes.get_mut(child) else {
            return;
        };

        match node.parent.take() {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent)
                    && let Some(pos) = parent.children.iter().position(|&c| c == child)
                {
                    parent.children.remove(pos);
                }
            }
            None => {
                if let Some(pos) = self.roots.iter().position(|&r| r == child) {
                    self.roots.remove(pos);
                }
            }
        }
    }

    /// Links an unlinked `child` under `parent`, or makes it a root when
    /// `parent` is `None` or not registered. Returns the parent actually used.
    pub(crate) fn link(&mut self, child: EntityId, parent: Option<EntityId>) -> Option<EntityId> {
        let parent = parent.filter(|&p| p != child && self.nodes.contains_key(p));

        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(p) {
                    node.children.push(child);
                }
            }
            None => self.roots.push(child),
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = parent;
        }
        parent
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root entities in registration/promotion order.
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Children of `id` in insertion order; empty when unknown.
    #[inline]
    #[must_use]
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    #[inline]
    #[must_use]
    pub fn index(&self, id: EntityId) -> Option<usize> {
        self.nodes.get(id).and_then(|n| n.index)
    }

    /// Returns `true` if `id` is registered and has no parent.
    #[inline]
    #[must_use]
    pub fn is_root(&self, id: EntityId) -> bool {
        self.nodes.get(id).is_some_and(SceneNode::is_root)
    }

    /// Returns `true` if `id` is registered and has no children.
    #[inline]
    #[must_use]
    pub fn is_leaf(&self, id: EntityId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.children.is_empty())
    }

    /// Iterates the ancestors of `id`, parent first.
    #[inline]
    #[must_use]
    pub fn ancestors(&self, id: EntityId) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            cursor: self.parent(id),
        }
    }

    /// Iterates the descendants of `id` in pre-order, children in insertion
    /// order. `id` itself is not yielded.
    #[must_use]
    pub fn descendants(&self, id: EntityId) -> Descendants<'_> {
        let stack = self.children(id).iter().rev().copied().collect();
        Descendants {
            registry: self,
            stack,
        }
    }

    /// Returns `true` if `candidate` is a (transitive) ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, id: EntityId, candidate: EntityId) -> bool {
        self.ancestors(id).any(|a| a == candidate)
    }
}

/// Iterator over the ancestors of a node, parent first.
pub struct Ancestors<'a> {
    registry: &'a SceneNodeRegistry,
    cursor: Option<EntityId>,
}

impl Iterator for Ancestors<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.registry.parent(current);
        Some(current)
    }
}

/// Depth-first, pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    registry: &'a SceneNodeRegistry,
    stack: Vec<EntityId>,
}

impl Iterator for Descendants<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.registry.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_core::SoaTransformStore;

    fn ids(n: usize) -> (SoaTransformStore, Vec<EntityId>) {
        let mut store = SoaTransformStore::new();
        let ids = (0..n).map(|_| store.spawn()).collect();
        (store, ids)
    }

    #[test]
    fn register_is_idempotent() {
        let (_, e) = ids(1);
        let mut registry = SceneNodeRegistry::new();

        assert!(registry.register(e[0], None));
        assert!(!registry.register(e[0], Some(3)));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.roots(), &[e[0]]);
        assert_eq!(registry.index(e[0]), None);
    }

    #[test]
    fn link_and_unlink_keep_roots_consistent() {
        let (_, e) = ids(3);
        let mut registry = SceneNodeRegistry::new();
        for &id in &e {
            registry.register(id, None);
        }

        registry.unlink(e[1]);
        assert_eq!(registry.link(e[1], Some(e[0])), Some(e[0]));
        registry.unlink(e[2]);
        assert_eq!(registry.link(e[2], Some(e[0])), Some(e[0]));

        assert_eq!(registry.roots(), &[e[0]]);
        assert_eq!(registry.children(e[0]), &[e[1], e[2]]);
        assert_eq!(registry.parent(e[2]), Some(e[0]));

        registry.unlink(e[1]);
        registry.link(e[1], None);
        assert_eq!(registry.children(e[0]), &[e[2]]);
        assert_eq!(registry.roots(), &[e[0], e[1]]);
    }

    #[test]
    fn link_to_unregistered_parent_makes_root() {
        let (_, e) = ids(2);
        let mut registry = SceneNodeRegistry::new();
        registry.register(e[0], None);

        registry.unlink(e[0]);
        assert_eq!(registry.link(e[0], Some(e[1])), None);
        assert!(registry.is_root(e[0]));
        assert_eq!(registry.roots(), &[e[0]]);
    }

    #[test]
    fn unregister_promotes_children() {
        let (_, e) = ids(4);
        let mut registry = SceneNodeRegistry::new();
        for &id in &e {
            registry.register(id, None);
        }
        for &(child, parent) in &[(e[1], e[0]), (e[2], e[1]), (e[3], e[1])] {
            registry.unlink(child);
            registry.link(child, Some(parent));
        }

        let removed = registry.unregister(e[1]).expect("registered");
        assert_eq!(removed.children(), &[e[2], e[3]]);

        assert!(!registry.contains(e[1]));
        assert!(registry.children(e[0]).is_empty());
        assert!(registry.is_root(e[2]));
        assert!(registry.is_root(e[3]));
        assert_eq!(registry.roots(), &[e[0], e[2], e[3]]);
    }

    #[test]
    fn walks_ancestors_and_descendants() {
        let (_, e) = ids(5);
        let mut registry = SceneNodeRegistry::new();
        for &id in &e {
            registry.register(id, None);
        }
        // e0 -> (e1 -> e3, e2 -> e4)
        for &(child, parent) in &[(e[1], e[0]), (e[2], e[0]), (e[3], e[1]), (e[4], e[2])] {
            registry.unlink(child);
            registry.link(child, Some(parent));
        }

        assert_eq!(registry.ancestors(e[4]).collect::<Vec<_>>(), vec![e[2], e[0]]);
        assert_eq!(
            registry.descendants(e[0]).collect::<Vec<_>>(),
            vec![e[1], e[3], e[2], e[4]]
        );
        assert!(registry.is_ancestor(e[3], e[0]));
        assert!(!registry.is_ancestor(e[3], e[2]));
        assert!(registry.is_leaf(e[3]));
    }

    #[test]
    fn refresh_reads_store_indices() {
        let (mut store, e) = ids(2);
        let mut registry = SceneNodeRegistry::new();
        registry.register(e[0], None);
        registry.register(e[1], None);

        registry.refresh_indices(&store);
        assert_eq!(registry.index(e[0]), Some(0));
        assert_eq!(registry.index(e[1]), Some(1));

        store.despawn(e[0]);
        registry.refresh_indices(&store);
        assert_eq!(registry.index(e[0]), None);
        assert_eq!(registry.index(e[1]), Some(0));
    }
}
