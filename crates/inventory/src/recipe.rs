//! Recipe definitions, consumed from the external recipe catalog.

use serde::{Deserialize, Serialize};

use stockbook_core::{ItemId, ProductId};

/// Ingredient line: quantity drawn per produced batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub item_id: ItemId,
    pub quantity_per_batch: f64,
}

/// Product recipe: the ingredient list one production batch consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub product_id: ProductId,
    pub lines: Vec<RecipeLine>,
}

impl Recipe {
    pub fn new(product_id: ProductId, lines: Vec<RecipeLine>) -> Self {
        Self { product_id, lines }
    }
}
