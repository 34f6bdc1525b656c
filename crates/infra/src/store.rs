//! Store traits for the bookkeeping core.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use stockbook_closing::DailySnapshot;
use stockbook_core::{ExpectedVersion, ItemId, PartyId};
use stockbook_inventory::{HistoryFilter, StockHistoryRecord, StockItem, StockMovement};
use stockbook_ledger::{LedgerTransaction, Party};

/// Store operation error (infrastructure-level; the engine maps these into
/// the domain taxonomy).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Version check failed: another writer committed first.
    #[error("version conflict: {0}")]
    Conflict(String),

    /// Unique constraint hit (snapshot per `(date, item)`, re-closed date).
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// A referenced row is missing.
    #[error("missing record: {0}")]
    Missing(String),

    /// The store itself is unusable (poisoned lock, backend failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Inventory rows plus their append-only audit log. An item's row and its
/// history append commit together: one serialization unit per item.
pub trait InventoryStore: Send + Sync {
    fn get(&self, id: &ItemId) -> Option<StockItem>;

    fn list(&self) -> Vec<StockItem>;

    /// Seed or replace a catalog row (the external catalog owns creation).
    fn put(&self, item: StockItem);

    /// Atomically write every item (all expected versions must match) and
    /// append every movement with store-assigned sequence numbers. Fully
    /// applied or fully rejected; committed records come back in order.
    fn commit(
        &self,
        writes: Vec<(ExpectedVersion, StockItem)>,
        movements: Vec<StockMovement>,
    ) -> Result<Vec<StockHistoryRecord>, StoreError>;

    /// Audit records matching `filter`, ordered by `(date, sequence)`.
    fn history(&self, filter: &HistoryFilter) -> Vec<StockHistoryRecord>;
}

/// Parties plus their transactions. A party's row and its transaction list
/// commit together: one serialization unit per party.
pub trait LedgerStore: Send + Sync {
    fn party(&self, id: &PartyId) -> Option<Party>;

    fn parties(&self) -> Vec<Party>;

    /// Seed or replace a party row (the external catalog owns creation).
    fn put_party(&self, party: Party);

    /// A party's transactions ordered by `(transaction_date, sequence)`.
    fn transactions(&self, id: &PartyId) -> Vec<LedgerTransaction>;

    /// Atomically replace the party row and its full (recomputed)
    /// transaction sequence. Returns the committed party.
    fn commit(
        &self,
        expected: ExpectedVersion,
        party: Party,
        transactions: Vec<LedgerTransaction>,
    ) -> Result<Party, StoreError>;
}

/// Immutable daily snapshots plus the closed-date registry.
pub trait SnapshotStore: Send + Sync {
    fn is_closed(&self, date: NaiveDate) -> bool;

    fn get(&self, date: NaiveDate, item_id: &ItemId) -> Option<DailySnapshot>;

    fn for_date(&self, date: NaiveDate) -> Vec<DailySnapshot>;

    /// Register `date` as closed; fails with `Duplicate` when it already is.
    fn begin_close(&self, date: NaiveDate) -> Result<(), StoreError>;

    /// Insert a frozen snapshot. `(date, item)` is unique; existing
    /// snapshots are never overwritten.
    fn insert(&self, snapshot: DailySnapshot) -> Result<(), StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn get(&self, id: &ItemId) -> Option<StockItem> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<StockItem> {
        (**self).list()
    }

    fn put(&self, item: StockItem) {
        (**self).put(item)
    }

    fn commit(
        &self,
        writes: Vec<(ExpectedVersion, StockItem)>,
        movements: Vec<StockMovement>,
    ) -> Result<Vec<StockHistoryRecord>, StoreError> {
        (**self).commit(writes, movements)
    }

    fn history(&self, filter: &HistoryFilter) -> Vec<StockHistoryRecord> {
        (**self).history(filter)
    }
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn party(&self, id: &PartyId) -> Option<Party> {
        (**self).party(id)
    }

    fn parties(&self) -> Vec<Party> {
        (**self).parties()
    }

    fn put_party(&self, party: Party) {
        (**self).put_party(party)
    }

    fn transactions(&self, id: &PartyId) -> Vec<LedgerTransaction> {
        (**self).transactions(id)
    }

    fn commit(
        &self,
        expected: ExpectedVersion,
        party: Party,
        transactions: Vec<LedgerTransaction>,
    ) -> Result<Party, StoreError> {
        (**self).commit(expected, party, transactions)
    }
}

impl<S> SnapshotStore for Arc<S>
where
    S: SnapshotStore + ?Sized,
{
    fn is_closed(&self, date: NaiveDate) -> bool {
        (**self).is_closed(date)
    }

    fn get(&self, date: NaiveDate, item_id: &ItemId) -> Option<DailySnapshot> {
        (**self).get(date, item_id)
    }

    fn for_date(&self, date: NaiveDate) -> Vec<DailySnapshot> {
        (**self).for_date(date)
    }

    fn begin_close(&self, date: NaiveDate) -> Result<(), StoreError> {
        (**self).begin_close(date)
    }

    fn insert(&self, snapshot: DailySnapshot) -> Result<(), StoreError> {
        (**self).insert(snapshot)
    }
}
