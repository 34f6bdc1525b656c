//! Read queries over the injected stores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbook_closing::DailySnapshot;
use stockbook_core::{DomainError, DomainResult, ItemId, PartyId};
use stockbook_infra::{InventoryStore, LedgerStore, SnapshotStore};
use stockbook_inventory::{HistoryFilter, StockHistoryRecord, StockItem, StockStatus};
use stockbook_ledger::{Party, PartyStatement};

use crate::bookkeeper::Bookkeeper;

/// One row of the stock overview: the item plus its derived status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOverviewRow {
    pub status: StockStatus,
    pub item: StockItem,
}

impl<I, L, S> Bookkeeper<I, L, S>
where
    I: InventoryStore,
    L: LedgerStore,
    S: SnapshotStore,
{
    pub fn item(&self, id: &ItemId) -> DomainResult<StockItem> {
        self.inventory()
            .get(id)
            .ok_or_else(|| DomainError::not_found("item", id))
    }

    /// Current items with their derived stock status, sorted by name.
    pub fn stock_overview(&self) -> Vec<StockOverviewRow> {
        let mut rows: Vec<StockOverviewRow> = self
            .inventory()
            .list()
            .into_iter()
            .map(|item| StockOverviewRow {
                status: item.status(),
                item,
            })
            .collect();
        rows.sort_by(|a, b| a.item.name.cmp(&b.item.name));
        rows
    }

    pub fn snapshot(&self, date: NaiveDate, item_id: &ItemId) -> Option<DailySnapshot> {
        self.snapshot_store().get(date, item_id)
    }

    pub fn snapshots_for(&self, date: NaiveDate) -> Vec<DailySnapshot> {
        self.snapshot_store().for_date(date)
    }

    pub fn day_is_closed(&self, date: NaiveDate) -> bool {
        self.snapshot_store().is_closed(date)
    }

    /// Audit records matching `filter`, ordered by `(date, sequence)`.
    pub fn stock_history(&self, filter: &HistoryFilter) -> Vec<StockHistoryRecord> {
        self.inventory().history(filter)
    }

    pub fn parties(&self) -> Vec<Party> {
        self.ledger_store().parties()
    }

    /// A party's ordered transactions with running balances and aggregate
    /// debit/credit totals.
    pub fn party_statement(&self, id: &PartyId) -> DomainResult<PartyStatement> {
        let party = self
            .ledger_store()
            .party(id)
            .ok_or_else(|| DomainError::not_found("party", id))?;
        let transactions = self.ledger_store().transactions(id);
        Ok(PartyStatement::new(party, transactions))
    }
}
