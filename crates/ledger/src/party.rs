use serde::{Deserialize, Serialize};

use stockbook_core::{Entity, PartyId};

/// Party kind: customer or supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Supplier,
}

/// A customer/supplier account.
///
/// Invariant: `current_balance` equals the most recent transaction's running
/// balance in `(transaction_date, sequence)` order, or `opening_balance`
/// when no transactions exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub kind: PartyKind,
    pub opening_balance: f64,
    pub current_balance: f64,
    /// Optimistic-concurrency version; the store bumps it on every commit.
    pub version: u64,
}

impl Party {
    pub fn new(id: PartyId, name: impl Into<String>, kind: PartyKind, opening_balance: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            opening_balance,
            current_balance: opening_balance,
            version: 0,
        }
    }
}

impl Entity for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
