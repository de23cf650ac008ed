//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Anything that can be joined against a group roster implements this with
/// `Id = AssetId`.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

impl<T: Entity + ?Sized> Entity for &T {
    type Id = T::Id;

    fn id(&self) -> &Self::Id {
        (**self).id()
    }
}
