//! Frozen per-item state for a calendar date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult, ItemId};
use stockbook_inventory::StockItem;

/// Immutable daily snapshot. Created once per `(date, item)` by a day-close
/// and never updated afterwards; corrections happen as operations on later
/// dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub item_id: ItemId,
    pub primary_quantity: f64,
    /// Derived through the item's conversion factor at capture time; `None`
    /// when the item has no secondary unit.
    pub secondary_quantity: Option<f64>,
    pub average_cost: f64,
    pub total_value: f64,
    pub is_closed: bool,
}

impl DailySnapshot {
    /// Freeze an item's live state for `date`.
    pub fn capture(date: NaiveDate, item: &StockItem) -> DomainResult<Self> {
        let secondary_quantity = item.secondary_stock()?;
        Ok(Self {
            date,
            item_id: item.id,
            primary_quantity: item.current_stock,
            secondary_quantity,
            average_cost: item.average_cost,
            total_value: item.total_value,
            is_closed: true,
        })
    }
}

/// One item's failure inside a day-close batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCloseFailure {
    pub item_id: ItemId,
    pub error: DomainError,
}

/// Outcome of a day-close batch. The batch is best-effort across items: a
/// failure is recorded here and does not abort the remaining items.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCloseReport {
    pub date: NaiveDate,
    pub items_closed: usize,
    pub failures: Vec<DayCloseFailure>,
}

impl DayCloseReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            items_closed: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::{ItemId, approx_eq};
    use stockbook_units::{Unit, UnitScheme};

    #[test]
    fn capture_freezes_live_state_and_derives_secondary() {
        let mut item = StockItem::new(
            ItemId::new(),
            "Flour",
            UnitScheme::with_secondary(
                Unit::new("kg", "Kilogram", "kg"),
                Unit::new("g", "Gram", "g"),
                1000.0,
            ),
        );
        item.current_stock = 30.0;
        item.average_cost = 0.60;
        item.total_value = 18.0;

        let date = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        let snap = DailySnapshot::capture(date, &item).unwrap();
        assert_eq!(snap.item_id, item.id);
        assert!(approx_eq(snap.primary_quantity, 30.0));
        assert_eq!(snap.secondary_quantity, Some(30_000.0));
        assert!(approx_eq(snap.average_cost, 0.60));
        assert!(approx_eq(snap.total_value, 18.0));
        assert!(snap.is_closed);
    }

    #[test]
    fn capture_fails_when_the_factor_is_unusable() {
        let mut item = StockItem::new(
            ItemId::new(),
            "Flour",
            UnitScheme::with_secondary(
                Unit::new("kg", "Kilogram", "kg"),
                Unit::new("g", "Gram", "g"),
                0.0,
            ),
        );
        item.current_stock = 1.0;

        let date = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        let err = DailySnapshot::capture(date, &item).unwrap_err();
        assert!(matches!(err, DomainError::InvalidConversion(_)));
    }
}
