//! Domain error model.

use chrono::NaiveDate;
use thiserror::Error;

use crate::id::ItemId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Per-ingredient shortfall detail carried by [`DomainError::InsufficientStock`].
#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    pub item_id: ItemId,
    pub required: f64,
    pub available: f64,
}

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, missing
/// references, business-rule rejections). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A value failed validation (bad amounts, lengths, out-of-range dates).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced item, party or product does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Production requirements exceed availability. Carries every shortfall,
    /// not just the first.
    #[error("insufficient stock for {} ingredient(s)", .shortfalls.len())]
    InsufficientStock { shortfalls: Vec<Shortfall> },

    /// The date was already frozen by a prior day-close.
    #[error("day already closed: {date}")]
    AlreadyClosed { date: NaiveDate },

    /// Missing or non-positive conversion factor on an item with a
    /// secondary unit.
    #[error("invalid unit conversion: {0}")]
    InvalidConversion(String),

    /// Per-entity contention that bounded retry could not resolve.
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn insufficient_stock(shortfalls: Vec<Shortfall>) -> Self {
        Self::InsufficientStock { shortfalls }
    }

    pub fn already_closed(date: NaiveDate) -> Self {
        Self::AlreadyClosed { date }
    }

    pub fn invalid_conversion(msg: impl Into<String>) -> Self {
        Self::InvalidConversion(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(msg.into())
    }
}
