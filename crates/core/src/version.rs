//! Optimistic concurrency expectations.
//!
//! Every `StockItem` and `Party` is its own serialization unit. Writers load
//! an entity at some version, decide a next state, and commit with the loaded
//! version as the expectation; the store rejects the commit if another writer
//! got there first.

use crate::error::{DomainError, DomainResult};

/// Version expectation attached to a store commit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (catalog seeding, migrations).
    Any,
    /// Require the entity to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "version check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
