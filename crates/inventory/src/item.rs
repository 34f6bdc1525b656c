use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, EPSILON, Entity, ItemId, PartyId, approx_eq};
use stockbook_units::UnitScheme;

/// Stock level classification derived from quantity vs reorder level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

/// Live inventory state for one item.
///
/// Invariants: `total_value == current_stock * average_cost` within
/// tolerance; the secondary-unit quantity is always derived through the unit
/// scheme and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: ItemId,
    pub name: String,
    pub units: UnitScheme,
    pub current_stock: f64,
    pub reorder_level: f64,
    pub average_cost: f64,
    pub total_value: f64,
    pub last_cost_per_unit: Option<f64>,
    pub last_purchase_date: Option<NaiveDate>,
    /// Latest date frozen for this item by a day-close.
    pub last_closed_on: Option<NaiveDate>,
    pub supplier: Option<PartyId>,
    pub active: bool,
    /// Optimistic-concurrency version; the store bumps it on every commit.
    pub version: u64,
}

impl StockItem {
    /// Fresh catalog row: zero stock, zero cost basis.
    pub fn new(id: ItemId, name: impl Into<String>, units: UnitScheme) -> Self {
        Self {
            id,
            name: name.into(),
            units,
            current_stock: 0.0,
            reorder_level: 0.0,
            average_cost: 0.0,
            total_value: 0.0,
            last_cost_per_unit: None,
            last_purchase_date: None,
            last_closed_on: None,
            supplier: None,
            active: true,
            version: 0,
        }
    }

    pub fn status(&self) -> StockStatus {
        if self.current_stock <= EPSILON {
            StockStatus::OutOfStock
        } else if self.current_stock <= self.reorder_level + EPSILON {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Secondary-unit quantity derived through the conversion factor.
    pub fn secondary_stock(&self) -> DomainResult<Option<f64>> {
        self.units.secondary_quantity(self.current_stock)
    }

    /// Value invariant: quantity × average cost equals the stored value.
    pub fn value_consistent(&self) -> bool {
        approx_eq(self.total_value, self.current_stock * self.average_cost)
    }

    /// Whether `date` falls inside a period already frozen for this item.
    /// Corrections for closed dates must be posted on a later date.
    pub fn in_closed_period(&self, date: NaiveDate) -> bool {
        self.last_closed_on.is_some_and(|closed| date <= closed)
    }
}

impl Entity for StockItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
