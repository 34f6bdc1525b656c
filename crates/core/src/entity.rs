//! Entity marker: things with identity that persist across state changes.

/// Minimal interface for domain entities.
///
/// Two entities with the same id are the same entity, whatever their fields
/// currently say. `StockItem` and `Party` are entities; their append-only
/// audit records are plain values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
