//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values
/// (e.g. a capacity summary or a per-MW rate). Use [`crate::Entity`] when
/// identity matters instead.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
