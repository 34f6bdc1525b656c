//! Party statements: ordered transactions with aggregate totals, exportable
//! as printable rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::party::Party;
use crate::transaction::{LedgerTransaction, closing_balance};

/// One printable statement line. Exactly one of `debit`/`credit` is nonzero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub description: String,
    pub reference: Option<String>,
    pub debit: f64,
    pub credit: f64,
    pub balance: f64,
}

/// A party's full transaction history in chronological order, with debit and
/// credit totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyStatement {
    pub party: Party,
    pub transactions: Vec<LedgerTransaction>,
    pub total_debit: f64,
    pub total_credit: f64,
}

impl PartyStatement {
    /// Build from an ordered transaction list.
    pub fn new(party: Party, transactions: Vec<LedgerTransaction>) -> Self {
        let total_debit = transactions.iter().map(|t| t.amount.debit()).sum();
        let total_credit = transactions.iter().map(|t| t.amount.credit()).sum();
        Self {
            party,
            transactions,
            total_debit,
            total_credit,
        }
    }

    pub fn closing_balance(&self) -> f64 {
        closing_balance(self.party.opening_balance, &self.transactions)
    }

    /// Export rows in chronological order.
    pub fn rows(&self) -> Vec<StatementRow> {
        self.transactions
            .iter()
            .map(|t| StatementRow {
                date: t.transaction_date,
                description: t.description.clone(),
                reference: t.reference.clone(),
                debit: t.amount.debit(),
                credit: t.amount.credit(),
                balance: t.running_balance,
            })
            .collect()
    }
}
