//! In-memory stores for tests/dev. Not optimized for performance.
//!
//! Each store keeps one `RwLock` over its cells; a commit takes the write
//! lock once, checks every expected version, then applies every write inside
//! the same critical section. Readers never observe a partial commit.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use chrono::NaiveDate;

use stockbook_closing::DailySnapshot;
use stockbook_core::{ExpectedVersion, ItemId, PartyId};
use stockbook_inventory::{HistoryFilter, StockHistoryRecord, StockItem, StockMovement};
use stockbook_ledger::{LedgerTransaction, Party};

use crate::store::{InventoryStore, LedgerStore, SnapshotStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[derive(Debug, Default)]
struct InventoryCells {
    items: HashMap<ItemId, StockItem>,
    history: Vec<StockHistoryRecord>,
    next_sequence: u64,
}

/// In-memory inventory store: item rows + append-only audit log.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    cells: RwLock<InventoryCells>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn get(&self, id: &ItemId) -> Option<StockItem> {
        let cells = self.cells.read().ok()?;
        cells.items.get(id).cloned()
    }

    fn list(&self) -> Vec<StockItem> {
        let cells = match self.cells.read() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut items: Vec<StockItem> = cells.items.values().cloned().collect();
        items.sort_by_key(|i| *i.id.as_uuid().as_bytes());
        items
    }

    fn put(&self, item: StockItem) {
        if let Ok(mut cells) = self.cells.write() {
            cells.items.insert(item.id, item);
        }
    }

    fn commit(
        &self,
        writes: Vec<(ExpectedVersion, StockItem)>,
        movements: Vec<StockMovement>,
    ) -> Result<Vec<StockHistoryRecord>, StoreError> {
        let mut cells = self.cells.write().map_err(|_| poisoned())?;

        // Check every expectation before touching anything.
        let mut current_versions = Vec::with_capacity(writes.len());
        for (expected, item) in &writes {
            let current = cells
                .items
                .get(&item.id)
                .ok_or_else(|| StoreError::Missing(format!("item {}", item.id)))?;
            if !expected.matches(current.version) {
                return Err(StoreError::Conflict(format!(
                    "item {} expected {expected:?}, found {}",
                    item.id, current.version
                )));
            }
            current_versions.push(current.version);
        }

        for ((_, mut item), current) in writes.into_iter().zip(current_versions) {
            item.version = current + 1;
            cells.items.insert(item.id, item);
        }

        let mut committed = Vec::with_capacity(movements.len());
        for movement in movements {
            cells.next_sequence += 1;
            let record = movement.into_record(cells.next_sequence);
            cells.history.push(record.clone());
            committed.push(record);
        }

        Ok(committed)
    }

    fn history(&self, filter: &HistoryFilter) -> Vec<StockHistoryRecord> {
        let cells = match self.cells.read() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut records: Vec<StockHistoryRecord> = cells
            .history
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.date, r.sequence));
        records
    }
}

#[derive(Debug, Default)]
struct LedgerCells {
    parties: HashMap<PartyId, Party>,
    transactions: HashMap<PartyId, Vec<LedgerTransaction>>,
}

/// In-memory ledger store: party rows + per-party transaction sequences.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    cells: RwLock<LedgerCells>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn party(&self, id: &PartyId) -> Option<Party> {
        let cells = self.cells.read().ok()?;
        cells.parties.get(id).cloned()
    }

    fn parties(&self) -> Vec<Party> {
        let cells = match self.cells.read() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut parties: Vec<Party> = cells.parties.values().cloned().collect();
        parties.sort_by_key(|p| *p.id.as_uuid().as_bytes());
        parties
    }

    fn put_party(&self, party: Party) {
        if let Ok(mut cells) = self.cells.write() {
            cells.parties.insert(party.id, party);
        }
    }

    fn transactions(&self, id: &PartyId) -> Vec<LedgerTransaction> {
        let cells = match self.cells.read() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut txns = cells.transactions.get(id).cloned().unwrap_or_default();
        txns.sort_by_key(LedgerTransaction::order_key);
        txns
    }

    fn commit(
        &self,
        expected: ExpectedVersion,
        mut party: Party,
        transactions: Vec<LedgerTransaction>,
    ) -> Result<Party, StoreError> {
        let mut cells = self.cells.write().map_err(|_| poisoned())?;

        let current = cells
            .parties
            .get(&party.id)
            .ok_or_else(|| StoreError::Missing(format!("party {}", party.id)))?;
        if !expected.matches(current.version) {
            return Err(StoreError::Conflict(format!(
                "party {} expected {expected:?}, found {}",
                party.id, current.version
            )));
        }

        party.version = current.version + 1;
        let committed = party.clone();
        cells.transactions.insert(party.id, transactions);
        cells.parties.insert(party.id, party);
        Ok(committed)
    }
}

#[derive(Debug, Default)]
struct SnapshotCells {
    closed: BTreeSet<NaiveDate>,
    snapshots: HashMap<(NaiveDate, ItemId), DailySnapshot>,
}

/// In-memory snapshot store: immutable `(date, item)` rows + the closed-date
/// registry.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    cells: RwLock<SnapshotCells>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn is_closed(&self, date: NaiveDate) -> bool {
        self.cells
            .read()
            .map(|c| c.closed.contains(&date))
            .unwrap_or(false)
    }

    fn get(&self, date: NaiveDate, item_id: &ItemId) -> Option<DailySnapshot> {
        let cells = self.cells.read().ok()?;
        cells.snapshots.get(&(date, *item_id)).cloned()
    }

    fn for_date(&self, date: NaiveDate) -> Vec<DailySnapshot> {
        let cells = match self.cells.read() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut snaps: Vec<DailySnapshot> = cells
            .snapshots
            .iter()
            .filter_map(|((d, _), s)| (*d == date).then(|| s.clone()))
            .collect();
        snaps.sort_by_key(|s| *s.item_id.as_uuid().as_bytes());
        snaps
    }

    fn begin_close(&self, date: NaiveDate) -> Result<(), StoreError> {
        let mut cells = self.cells.write().map_err(|_| poisoned())?;
        if !cells.closed.insert(date) {
            return Err(StoreError::Duplicate(format!("date {date} already closed")));
        }
        Ok(())
    }

    fn insert(&self, snapshot: DailySnapshot) -> Result<(), StoreError> {
        let mut cells = self.cells.write().map_err(|_| poisoned())?;
        let key = (snapshot.date, snapshot.item_id);
        if cells.snapshots.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "snapshot for item {} on {}",
                snapshot.item_id, snapshot.date
            )));
        }
        cells.snapshots.insert(key, snapshot);
        Ok(())
    }
}
