use sylva_core::EntityId;

/// Topology record of one registered entity.
///
/// Parent and children are identifier references resolved through the
/// [`SceneNodeRegistry`](crate::SceneNodeRegistry); the node never owns other
/// nodes. Transform data lives in the bound store at [`index`](Self::index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub(crate) entity: EntityId,
    /// Slot in the bound store, `None` while the store does not know the entity.
    pub(crate) index: Option<usize>,
    pub(crate) parent: Option<EntityId>,
    /// Insertion order, which only fixes traversal order.
    pub(crate) children: Vec<EntityId>,
}

impl SceneNode {
    #[must_use]
    pub fn new(entity: EntityId, index: Option<usize>) -> Self {
        Self {
            entity,
            index,
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
