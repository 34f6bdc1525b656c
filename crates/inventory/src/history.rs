//! Append-only stock audit log types.
//!
//! Operations decide a [`StockMovement`]; the store turns it into a
//! [`StockHistoryRecord`] by assigning the next sequence number at append.
//! Records are ordered by `(date, sequence)` and never edited; corrections
//! are new movements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{EntryId, ItemId};

/// Stock-affecting movement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Purchase,
    Production,
    Adjustment,
}

/// A movement decided by a costing operation, not yet appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub kind: MovementKind,
    /// Signed: receipts positive, consumption negative.
    pub quantity: f64,
    pub unit_cost: f64,
    pub reference: Option<String>,
}

impl StockMovement {
    /// Commit this movement as the audit record at `sequence`.
    pub fn into_record(self, sequence: u64) -> StockHistoryRecord {
        StockHistoryRecord {
            id: EntryId::new(),
            sequence,
            date: self.date,
            item_id: self.item_id,
            kind: self.kind,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            reference: self.reference,
            recorded_at: Utc::now(),
        }
    }
}

/// A committed audit-log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistoryRecord {
    pub id: EntryId,
    /// Monotonically increasing insertion sequence, assigned at append.
    pub sequence: u64,
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub kind: MovementKind,
    pub quantity: f64,
    pub unit_cost: f64,
    pub reference: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Audit-log query filter; `None` fields match everything. The date range is
/// inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub item_id: Option<ItemId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_item(item_id: ItemId) -> Self {
        Self {
            item_id: Some(item_id),
            ..Self::default()
        }
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn matches(&self, record: &StockHistoryRecord) -> bool {
        if self.item_id.is_some_and(|id| id != record.item_id) {
            return false;
        }
        if self.from.is_some_and(|from| record.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.date > to) {
            return false;
        }
        true
    }
}
