//! `stockbook-units` — quantity conversion between an item's primary and
//! secondary unit.

pub mod convert;
pub mod unit;

pub use convert::{convert, to_primary, to_secondary};
pub use unit::{SecondaryUnit, Unit, UnitScheme};
