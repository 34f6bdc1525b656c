//! Weighted-average costing operations.
//!
//! Each operation is a pure decision: it validates an entry against the prior
//! item state and returns the next state plus the movement to append, or an
//! error and no change. Purchases blend the cost basis by quantity;
//! consumption and adjustments never move it.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbook_core::{
    DomainError, DomainResult, EPSILON, ItemId, PartyId, ProductId, Shortfall, is_positive_amount,
};

use crate::history::{MovementKind, StockMovement};
use crate::item::StockItem;
use crate::recipe::Recipe;

/// A goods receipt against one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEntry {
    pub item_id: ItemId,
    pub quantity: f64,
    pub cost_per_unit: f64,
    pub supplier: Option<PartyId>,
    pub invoice_no: Option<String>,
    pub batch_no: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub date: NaiveDate,
}

/// A manual stock correction. Signed quantity; the cost basis is untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    pub item_id: ItemId,
    pub quantity: f64,
    pub reason: String,
    pub date: NaiveDate,
}

/// Production order input. Recipe line quantities scale by `quantity`
/// batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub product_id: ProductId,
    pub quantity: f64,
    pub recipe: Recipe,
    pub date: NaiveDate,
    pub reference: Option<String>,
}

/// One ingredient draw a production order will make, valued at the
/// pre-deduction average cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDraw {
    pub item_id: ItemId,
    pub quantity_used: f64,
    pub cost_allocated: f64,
}

/// Sufficiency-checked plan for a production order. Exists only when every
/// ingredient can be served in full.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionPlan {
    pub draws: Vec<IngredientDraw>,
}

impl ProductionPlan {
    pub fn total_cost(&self) -> f64 {
        self.draws.iter().map(|d| d.cost_allocated).sum()
    }
}

/// Committed production record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEntry {
    pub product_id: ProductId,
    pub quantity: f64,
    pub consumed: Vec<IngredientConsumption>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientConsumption {
    pub item_id: ItemId,
    pub quantity_used: f64,
    pub cost_allocated: f64,
}

impl ProductionEntry {
    pub fn total_cost(&self) -> f64 {
        self.consumed.iter().map(|c| c.cost_allocated).sum()
    }
}

fn ensure_targets(item: &StockItem, item_id: ItemId) -> DomainResult<()> {
    if item.id != item_id {
        return Err(DomainError::validation("entry targets a different item"));
    }
    Ok(())
}

fn ensure_open_period(item: &StockItem, date: NaiveDate) -> DomainResult<()> {
    if item.in_closed_period(date) {
        return Err(DomainError::validation(format!(
            "{date} is closed for item {}; post the correction on a later date",
            item.id
        )));
    }
    Ok(())
}

/// Apply a purchase, blending the cost basis:
/// `new_avg = (stock*avg + qty*cost) / (stock + qty)`.
pub fn receive_purchase(
    item: &StockItem,
    entry: &PurchaseEntry,
) -> DomainResult<(StockItem, StockMovement)> {
    ensure_targets(item, entry.item_id)?;
    if !is_positive_amount(entry.quantity) {
        return Err(DomainError::validation(
            "purchase quantity must be positive",
        ));
    }
    if !is_positive_amount(entry.cost_per_unit) {
        return Err(DomainError::validation(
            "purchase cost per unit must be positive",
        ));
    }
    ensure_open_period(item, entry.date)?;

    let mut next = item.clone();
    let prior_value = item.current_stock * item.average_cost;
    next.current_stock = item.current_stock + entry.quantity;
    next.average_cost =
        (prior_value + entry.quantity * entry.cost_per_unit) / next.current_stock;
    next.total_value = next.current_stock * next.average_cost;
    next.last_cost_per_unit = Some(entry.cost_per_unit);
    next.last_purchase_date = Some(entry.date);
    if entry.supplier.is_some() {
        next.supplier = entry.supplier;
    }

    let movement = StockMovement {
        date: entry.date,
        item_id: item.id,
        kind: MovementKind::Purchase,
        quantity: entry.quantity,
        unit_cost: entry.cost_per_unit,
        reference: entry.invoice_no.clone(),
    };

    Ok((next, movement))
}

/// Apply a signed manual correction. Stock may not go negative; the average
/// cost stays where purchases left it.
pub fn adjust_stock(
    item: &StockItem,
    entry: &AdjustmentEntry,
) -> DomainResult<(StockItem, StockMovement)> {
    ensure_targets(item, entry.item_id)?;
    if !entry.quantity.is_finite() || entry.quantity == 0.0 {
        return Err(DomainError::validation(
            "adjustment quantity must be nonzero",
        ));
    }
    ensure_open_period(item, entry.date)?;

    let new_stock = item.current_stock + entry.quantity;
    if new_stock < -EPSILON {
        return Err(DomainError::validation(format!(
            "adjustment would drive stock negative ({} available, {} removed)",
            item.current_stock, -entry.quantity
        )));
    }

    let mut next = item.clone();
    next.current_stock = new_stock.max(0.0);
    next.total_value = next.current_stock * next.average_cost;

    let movement = StockMovement {
        date: entry.date,
        item_id: item.id,
        kind: MovementKind::Adjustment,
        quantity: entry.quantity,
        unit_cost: item.average_cost,
        reference: Some(entry.reason.clone()),
    };

    Ok((next, movement))
}

/// Check a production order against ingredient stock, all lines before any
/// mutation. Either every ingredient can be served and a plan comes back, or
/// the whole order fails with every shortfall listed.
pub fn plan_production(
    order: &ProductionOrder,
    ingredients: &[StockItem],
) -> DomainResult<ProductionPlan> {
    if !is_positive_amount(order.quantity) {
        return Err(DomainError::validation(
            "production quantity must be positive",
        ));
    }
    if order.recipe.product_id != order.product_id {
        return Err(DomainError::validation(
            "recipe belongs to a different product",
        ));
    }
    if order.recipe.lines.is_empty() {
        return Err(DomainError::validation("recipe has no ingredients"));
    }

    // Aggregate per item first: a recipe may list the same ingredient twice,
    // and sufficiency is judged against the combined requirement.
    let mut required: HashMap<ItemId, f64> = HashMap::new();
    let mut order_of_appearance: Vec<ItemId> = Vec::new();
    for line in &order.recipe.lines {
        if !is_positive_amount(line.quantity_per_batch) {
            return Err(DomainError::validation(
                "recipe line quantity must be positive",
            ));
        }
        let slot = required.entry(line.item_id).or_insert_with(|| {
            order_of_appearance.push(line.item_id);
            0.0
        });
        *slot += line.quantity_per_batch * order.quantity;
    }

    let mut draws = Vec::with_capacity(order_of_appearance.len());
    let mut shortfalls = Vec::new();
    for item_id in order_of_appearance {
        let item = ingredients
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| DomainError::not_found("item", item_id))?;
        ensure_open_period(item, order.date)?;

        let needed = required[&item_id];
        if needed > item.current_stock + EPSILON {
            shortfalls.push(Shortfall {
                item_id,
                required: needed,
                available: item.current_stock,
            });
            continue;
        }
        draws.push(IngredientDraw {
            item_id,
            quantity_used: needed,
            cost_allocated: needed * item.average_cost,
        });
    }

    if !shortfalls.is_empty() {
        return Err(DomainError::insufficient_stock(shortfalls));
    }

    Ok(ProductionPlan { draws })
}

/// Deduct one planned draw from its item. Consumption never revises the
/// average cost; only purchases move the cost basis.
pub fn consume_draw(
    item: &StockItem,
    draw: &IngredientDraw,
    date: NaiveDate,
    reference: Option<&str>,
) -> (StockItem, StockMovement) {
    let mut next = item.clone();
    next.current_stock = (item.current_stock - draw.quantity_used).max(0.0);
    next.total_value = next.current_stock * next.average_cost;

    let movement = StockMovement {
        date,
        item_id: item.id,
        kind: MovementKind::Production,
        quantity: -draw.quantity_used,
        unit_cost: item.average_cost,
        reference: reference.map(str::to_owned),
    };

    (next, movement)
}
