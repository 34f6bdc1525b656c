//! Ledger transactions and the running-balance rules.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{
    DomainError, DomainResult, EntryId, PartyId, ValueObject, is_positive_amount,
};

/// Largest amount a single transaction may carry.
pub const MAX_AMOUNT: f64 = 999_999_999.99;

/// Description length bounds (after trimming).
pub const MIN_DESCRIPTION: usize = 3;
pub const MAX_DESCRIPTION: usize = 500;

/// Exactly one side of a ledger entry, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryAmount {
    Debit(f64),
    Credit(f64),
}

impl EntryAmount {
    /// Magnitude regardless of side.
    pub fn value(&self) -> f64 {
        match self {
            EntryAmount::Debit(v) | EntryAmount::Credit(v) => *v,
        }
    }

    /// Effect on the running balance: debits add, credits subtract.
    pub fn signed(&self) -> f64 {
        match self {
            EntryAmount::Debit(v) => *v,
            EntryAmount::Credit(v) => -*v,
        }
    }

    pub fn debit(&self) -> f64 {
        match self {
            EntryAmount::Debit(v) => *v,
            EntryAmount::Credit(_) => 0.0,
        }
    }

    pub fn credit(&self) -> f64 {
        match self {
            EntryAmount::Debit(_) => 0.0,
            EntryAmount::Credit(v) => *v,
        }
    }
}

impl ValueObject for EntryAmount {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Sale,
    Purchase,
    Payment,
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Cheque,
    Other,
}

/// A committed ledger transaction.
///
/// Amounts are immutable once committed; `running_balance` is derived state
/// and is rewritten when a backdated entry lands earlier in the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: EntryId,
    pub party_id: PartyId,
    pub transaction_date: NaiveDate,
    /// Per-party insertion order; breaks ties between same-date entries.
    pub sequence: u64,
    pub description: String,
    pub reference: Option<String>,
    pub amount: EntryAmount,
    pub running_balance: f64,
    pub kind: TransactionKind,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Chronological ordering key.
    pub fn order_key(&self) -> (NaiveDate, u64) {
        (self.transaction_date, self.sequence)
    }
}

/// What a caller submits. Ids, sequence and running balance are assigned at
/// posting time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub party_id: PartyId,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub amount: EntryAmount,
    pub kind: TransactionKind,
    pub reference: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

impl Posting {
    /// Materialize as a transaction at `sequence`. The running balance is a
    /// placeholder until [`recompute_running_balances`] runs.
    pub fn into_transaction(self, sequence: u64) -> LedgerTransaction {
        LedgerTransaction {
            id: EntryId::new(),
            party_id: self.party_id,
            transaction_date: self.transaction_date,
            sequence,
            description: self.description.trim().to_string(),
            reference: self.reference,
            amount: self.amount,
            running_balance: 0.0,
            kind: self.kind,
            payment_method: self.payment_method,
            notes: self.notes,
            recorded_at: Utc::now(),
        }
    }
}

/// Validate a posting against the amount, description and date rules.
/// `today` is passed explicitly so callers and tests share one clock.
pub fn validate_posting(posting: &Posting, today: NaiveDate) -> DomainResult<()> {
    let value = posting.amount.value();
    if !is_positive_amount(value) {
        return Err(DomainError::validation("amount must be positive"));
    }
    if value > MAX_AMOUNT {
        return Err(DomainError::validation(format!(
            "amount exceeds the maximum of {MAX_AMOUNT}"
        )));
    }

    let description = posting.description.trim();
    if description.len() < MIN_DESCRIPTION || description.len() > MAX_DESCRIPTION {
        return Err(DomainError::validation(format!(
            "description must be {MIN_DESCRIPTION} to {MAX_DESCRIPTION} characters"
        )));
    }

    if posting.transaction_date > today {
        return Err(DomainError::validation(
            "transaction date cannot be in the future",
        ));
    }
    if posting.transaction_date < today - Duration::days(365) {
        return Err(DomainError::validation(
            "transaction date is more than one year in the past",
        ));
    }

    Ok(())
}

/// Insert `txn` at its chronological position: after every entry dated on or
/// before it. `transactions` must already be ordered by `(date, sequence)`;
/// the new entry carries the party's highest sequence, so it lands after all
/// same-date entries.
pub fn insert_transaction(transactions: &mut Vec<LedgerTransaction>, txn: LedgerTransaction) {
    let at = transactions.partition_point(|t| t.transaction_date <= txn.transaction_date);
    transactions.insert(at, txn);
}

/// Recompute every running balance in chronological order from the opening
/// balance: `balance[n] = balance[n-1] + debit[n] - credit[n]`. Restores the
/// ledger invariant for the whole sequence after a backdated insert.
pub fn recompute_running_balances(opening_balance: f64, transactions: &mut [LedgerTransaction]) {
    let mut balance = opening_balance;
    for txn in transactions.iter_mut() {
        balance += txn.amount.signed();
        txn.running_balance = balance;
    }
}

/// Closing balance of an ordered list, or the opening balance when empty.
pub fn closing_balance(opening_balance: f64, transactions: &[LedgerTransaction]) -> f64 {
    transactions
        .last()
        .map_or(opening_balance, |t| t.running_balance)
}
