//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances
/// with the same attributes are the same value. "Modifying" one means
/// constructing a new one. A debit amount or a unit binding is a value
/// object; a stock item with an id is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
