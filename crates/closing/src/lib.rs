//! `stockbook-closing` — daily snapshots and the day-close batch.

pub mod snapshot;

pub use snapshot::{DailySnapshot, DayCloseFailure, DayCloseReport};
