use slotmap::new_key_type;

new_key_type! {
    /// Stable, opaque identifier of an entity.
    ///
    /// Ids are allocated by a [`SoaTransformStore`](crate::SoaTransformStore)
    /// and stay valid (and unique) until the entity is despawned. A despawned
    /// id is never handed out again, so stale ids simply stop resolving.
    pub struct EntityId;
}
