//! Command orchestration.
//!
//! Every command runs the same pipeline: load current state, decide the next
//! state with a pure domain function, commit atomically with the loaded
//! versions. Stale commits are retried a bounded number of times before a
//! conflict surfaces; validation and business-rule failures return
//! immediately with zero state change.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stockbook_closing::{DailySnapshot, DayCloseFailure, DayCloseReport};
use stockbook_core::{DomainError, DomainResult, ExpectedVersion, ItemId};
use stockbook_infra::{InventoryStore, LedgerStore, SnapshotStore, StoreError};
use stockbook_inventory::{
    AdjustmentEntry, IngredientConsumption, ProductionEntry, ProductionOrder, PurchaseEntry,
    StockHistoryRecord, StockItem, adjust_stock, consume_draw, plan_production, receive_purchase,
};
use stockbook_ledger::{
    LedgerTransaction, Party, Posting, closing_balance, insert_transaction,
    recompute_running_balances, validate_posting,
};

/// Bounded retries for per-entity commit contention before the conflict
/// surfaces to the caller.
const COMMIT_RETRIES: usize = 3;

fn map_store_error(err: StoreError) -> DomainError {
    match err {
        StoreError::Conflict(msg) | StoreError::Unavailable(msg) => DomainError::conflict(msg),
        StoreError::Duplicate(msg) => DomainError::validation(msg),
        StoreError::Missing(msg) => DomainError::not_found("record", msg),
    }
}

/// Receipt for an applied purchase: committed item state + audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub item: StockItem,
    pub record: StockHistoryRecord,
}

/// Receipt for an applied manual adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentReceipt {
    pub item: StockItem,
    pub record: StockHistoryRecord,
}

/// The bookkeeping facade: weighted-average inventory costing, daily
/// snapshots and the party ledger, over injected stores.
#[derive(Debug)]
pub struct Bookkeeper<I, L, S> {
    inventory: I,
    ledger: L,
    snapshots: S,
}

impl<I, L, S> Bookkeeper<I, L, S> {
    pub fn new(inventory: I, ledger: L, snapshots: S) -> Self {
        Self {
            inventory,
            ledger,
            snapshots,
        }
    }
}

impl<I, L, S> Bookkeeper<I, L, S>
where
    I: InventoryStore,
    L: LedgerStore,
    S: SnapshotStore,
{
    /// Seed an item row from the external catalog.
    pub fn register_item(&self, item: StockItem) {
        self.inventory.put(item);
    }

    /// Seed a party row from the external catalog.
    pub fn register_party(&self, party: Party) {
        self.ledger.put_party(party);
    }

    pub(crate) fn inventory(&self) -> &I {
        &self.inventory
    }

    pub(crate) fn ledger_store(&self) -> &L {
        &self.ledger
    }

    pub(crate) fn snapshot_store(&self) -> &S {
        &self.snapshots
    }

    fn load_active_item(&self, id: &ItemId) -> DomainResult<StockItem> {
        let item = self
            .inventory
            .get(id)
            .ok_or_else(|| DomainError::not_found("item", id))?;
        if !item.active {
            return Err(DomainError::validation(format!("item {id} is inactive")));
        }
        Ok(item)
    }

    /// Apply a purchase: blend the weighted-average cost and append the
    /// audit record, atomically.
    pub fn apply_purchase(&self, entry: PurchaseEntry) -> DomainResult<PurchaseReceipt> {
        let mut attempts = 0;
        loop {
            let item = self.load_active_item(&entry.item_id)?;
            let (next, movement) = receive_purchase(&item, &entry)?;
            let mut committed_item = next.clone();
            committed_item.version = item.version + 1;

            match self.inventory.commit(
                vec![(ExpectedVersion::Exact(item.version), next)],
                vec![movement],
            ) {
                Ok(mut records) => {
                    let record = records
                        .pop()
                        .ok_or_else(|| DomainError::conflict("store returned no audit record"))?;
                    info!(
                        item = %entry.item_id,
                        quantity = entry.quantity,
                        cost = entry.cost_per_unit,
                        "purchase applied"
                    );
                    return Ok(PurchaseReceipt {
                        item: committed_item,
                        record,
                    });
                }
                Err(StoreError::Conflict(_)) if attempts < COMMIT_RETRIES => attempts += 1,
                Err(err) => return Err(map_store_error(err)),
            }
        }
    }

    /// Apply a signed manual correction; the cost basis stays untouched.
    pub fn apply_adjustment(&self, entry: AdjustmentEntry) -> DomainResult<AdjustmentReceipt> {
        let mut attempts = 0;
        loop {
            let item = self.load_active_item(&entry.item_id)?;
            let (next, movement) = adjust_stock(&item, &entry)?;
            let mut committed_item = next.clone();
            committed_item.version = item.version + 1;

            match self.inventory.commit(
                vec![(ExpectedVersion::Exact(item.version), next)],
                vec![movement],
            ) {
                Ok(mut records) => {
                    let record = records
                        .pop()
                        .ok_or_else(|| DomainError::conflict("store returned no audit record"))?;
                    info!(item = %entry.item_id, quantity = entry.quantity, "adjustment applied");
                    return Ok(AdjustmentReceipt {
                        item: committed_item,
                        record,
                    });
                }
                Err(StoreError::Conflict(_)) if attempts < COMMIT_RETRIES => attempts += 1,
                Err(err) => return Err(map_store_error(err)),
            }
        }
    }

    /// Run a production order: sufficiency-check every ingredient first,
    /// then deduct all of them in one atomic commit. A shortfall anywhere
    /// fails the whole order with every shortfall listed.
    pub fn apply_production(&self, order: ProductionOrder) -> DomainResult<ProductionEntry> {
        let mut attempts = 0;
        loop {
            let mut ingredients: Vec<StockItem> = Vec::new();
            for line in &order.recipe.lines {
                if ingredients.iter().any(|i| i.id == line.item_id) {
                    continue;
                }
                ingredients.push(self.load_active_item(&line.item_id)?);
            }

            let plan = plan_production(&order, &ingredients)?;

            let mut writes = Vec::with_capacity(plan.draws.len());
            let mut movements = Vec::with_capacity(plan.draws.len());
            let mut consumed = Vec::with_capacity(plan.draws.len());
            for draw in &plan.draws {
                let item = ingredients
                    .iter()
                    .find(|i| i.id == draw.item_id)
                    .ok_or_else(|| DomainError::not_found("item", draw.item_id))?;
                let (next, movement) =
                    consume_draw(item, draw, order.date, order.reference.as_deref());
                writes.push((ExpectedVersion::Exact(item.version), next));
                movements.push(movement);
                consumed.push(IngredientConsumption {
                    item_id: draw.item_id,
                    quantity_used: draw.quantity_used,
                    cost_allocated: draw.cost_allocated,
                });
            }

            match self.inventory.commit(writes, movements) {
                Ok(_) => {
                    info!(
                        product = %order.product_id,
                        quantity = order.quantity,
                        ingredients = consumed.len(),
                        "production applied"
                    );
                    return Ok(ProductionEntry {
                        product_id: order.product_id,
                        quantity: order.quantity,
                        consumed,
                        date: order.date,
                    });
                }
                Err(StoreError::Conflict(_)) if attempts < COMMIT_RETRIES => attempts += 1,
                Err(err) => return Err(map_store_error(err)),
            }
        }
    }

    /// Freeze every active item's state for `date`. Re-closing a closed date
    /// fails; a failure on one item is logged and does not abort the others.
    pub fn close_day(&self, date: NaiveDate) -> DomainResult<DayCloseReport> {
        match self.snapshots.begin_close(date) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(DomainError::already_closed(date)),
            Err(err) => return Err(map_store_error(err)),
        }

        let mut report = DayCloseReport::new(date);
        for item in self.inventory.list().into_iter().filter(|i| i.active) {
            match self.close_item(date, item.id) {
                Ok(()) => report.items_closed += 1,
                Err(error) => {
                    warn!(item = %item.id, %date, %error, "day-close failed for item; continuing");
                    report.failures.push(DayCloseFailure {
                        item_id: item.id,
                        error,
                    });
                }
            }
        }

        info!(
            %date,
            closed = report.items_closed,
            failed = report.failures.len(),
            "day closed"
        );
        Ok(report)
    }

    fn close_item(&self, date: NaiveDate, item_id: ItemId) -> DomainResult<()> {
        let item = self
            .inventory
            .get(&item_id)
            .ok_or_else(|| DomainError::not_found("item", item_id))?;
        let snapshot = DailySnapshot::capture(date, &item)?;
        match self.snapshots.insert(snapshot) {
            Ok(()) => {}
            Err(StoreError::Duplicate(msg)) => return Err(DomainError::validation(msg)),
            Err(err) => return Err(map_store_error(err)),
        }

        // Stamp the item's closed marker. A concurrent purchase may bump the
        // version between capture and stamp, so reload and retry.
        let mut attempts = 0;
        loop {
            let current = self
                .inventory
                .get(&item_id)
                .ok_or_else(|| DomainError::not_found("item", item_id))?;
            if current.last_closed_on.is_some_and(|closed| closed >= date) {
                return Ok(());
            }
            let mut next = current.clone();
            next.last_closed_on = Some(date);
            match self
                .inventory
                .commit(vec![(ExpectedVersion::Exact(current.version), next)], vec![])
            {
                Ok(_) => return Ok(()),
                Err(StoreError::Conflict(_)) if attempts < COMMIT_RETRIES => attempts += 1,
                Err(err) => return Err(map_store_error(err)),
            }
        }
    }

    /// Post a debit/credit transaction. A backdated date lands at its
    /// chronological position and every later running balance is recomputed
    /// in the same atomic commit.
    pub fn post_transaction(&self, posting: Posting) -> DomainResult<LedgerTransaction> {
        validate_posting(&posting, Utc::now().date_naive())?;

        let mut attempts = 0;
        loop {
            let party = self
                .ledger
                .party(&posting.party_id)
                .ok_or_else(|| DomainError::not_found("party", posting.party_id))?;
            let mut transactions = self.ledger.transactions(&party.id);
            let sequence = transactions.iter().map(|t| t.sequence).max().unwrap_or(0) + 1;

            let txn = posting.clone().into_transaction(sequence);
            let txn_id = txn.id;
            let backdated = transactions
                .last()
                .is_some_and(|last| txn.transaction_date < last.transaction_date);

            insert_transaction(&mut transactions, txn);
            recompute_running_balances(party.opening_balance, &mut transactions);

            let mut next_party = party.clone();
            next_party.current_balance = closing_balance(party.opening_balance, &transactions);

            match self.ledger.commit(
                ExpectedVersion::Exact(party.version),
                next_party,
                transactions.clone(),
            ) {
                Ok(_) => {
                    let committed = transactions
                        .into_iter()
                        .find(|t| t.id == txn_id)
                        .ok_or_else(|| {
                            DomainError::conflict("posted transaction missing after commit")
                        })?;
                    info!(
                        party = %posting.party_id,
                        backdated,
                        balance = committed.running_balance,
                        "transaction posted"
                    );
                    return Ok(committed);
                }
                Err(StoreError::Conflict(_)) if attempts < COMMIT_RETRIES => attempts += 1,
                Err(err) => return Err(map_store_error(err)),
            }
        }
    }
}
