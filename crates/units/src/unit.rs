use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, ValueObject};

use crate::convert;

/// Measurement unit, as provided by the external unit catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Stable unit code, e.g. "kg". Units are compared by code.
    pub code: String,
    pub name: String,
    pub abbreviation: String,
    pub active: bool,
}

impl Unit {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            abbreviation: abbreviation.into(),
            active: true,
        }
    }

    pub fn same_as(&self, other: &Unit) -> bool {
        self.code == other.code
    }
}

impl ValueObject for Unit {}

/// Secondary unit binding for one item.
///
/// `factor` expresses how many secondary units equal one primary unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryUnit {
    pub unit: Unit,
    pub factor: f64,
}

impl ValueObject for SecondaryUnit {}

/// The unit pair of one item: a primary unit and an optional secondary
/// binding. All quantity resolution between the two goes through here so the
/// conversion direction stays uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitScheme {
    pub primary: Unit,
    pub secondary: Option<SecondaryUnit>,
}

impl UnitScheme {
    pub fn primary_only(primary: Unit) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(primary: Unit, unit: Unit, factor: f64) -> Self {
        Self {
            primary,
            secondary: Some(SecondaryUnit { unit, factor }),
        }
    }

    fn factor(&self) -> Option<f64> {
        self.secondary.as_ref().map(|s| s.factor)
    }

    /// Convert `quantity` from `from` to `to` within this scheme.
    pub fn convert(&self, quantity: f64, from: &Unit, to: &Unit) -> DomainResult<f64> {
        convert::convert(quantity, from, to, self)
    }

    /// Derive the secondary-unit quantity for a primary-unit quantity.
    ///
    /// `None` when the item has no secondary unit; an error when a secondary
    /// unit exists but its factor is unusable.
    pub fn secondary_quantity(&self, primary_qty: f64) -> DomainResult<Option<f64>> {
        match &self.secondary {
            None => Ok(None),
            Some(_) => convert::to_secondary(primary_qty, self.factor()).map(Some),
        }
    }
}

impl ValueObject for UnitScheme {}
