//! `stockbook-ledger` — per-party debit/credit ledger with a maintained
//! running balance.
//!
//! Transactions are append-only and immutable in their amounts; running
//! balances are derived state and recomputed chronologically whenever a
//! backdated entry lands in the middle of a party's sequence.

pub mod party;
pub mod statement;
pub mod transaction;

pub use party::{Party, PartyKind};
pub use statement::{PartyStatement, StatementRow};
pub use transaction::{
    EntryAmount, LedgerTransaction, MAX_AMOUNT, MAX_DESCRIPTION, MIN_DESCRIPTION, PaymentMethod,
    Posting, TransactionKind, closing_balance, insert_transaction, recompute_running_balances,
    validate_posting,
};
