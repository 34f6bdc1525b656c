//! Infrastructure layer: store abstractions and in-memory implementations.
//!
//! Stores own durability and per-entity serialization. Commits carry the
//! writer's expected versions and are atomic across every record they touch:
//! a multi-item production deduction or a party's recomputed transaction tail
//! is fully applied or fully rejected, never half-visible.

pub mod memory;
pub mod store;

pub use memory::{InMemoryInventoryStore, InMemoryLedgerStore, InMemorySnapshotStore};
pub use store::{InventoryStore, LedgerStore, SnapshotStore, StoreError};
