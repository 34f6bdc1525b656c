//! `stockbook-engine` — the bookkeeping command/query facade.
//!
//! The hosting application talks to [`Bookkeeper`]: four commands
//! (`apply_purchase`, `apply_production`, `close_day`, `post_transaction`,
//! plus the `apply_adjustment` correction entry point) and the read queries.
//! This is a library-level contract; transports live in the host.

pub mod bookkeeper;
pub mod queries;

pub use bookkeeper::{AdjustmentReceipt, Bookkeeper, PurchaseReceipt};
pub use queries::StockOverviewRow;
