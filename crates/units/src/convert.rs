//! Quantity conversion.
//!
//! Canonical direction, applied uniformly: the factor expresses how many
//! secondary units equal one primary unit. Primary → secondary multiplies;
//! the inverse conversion divides. Round-trips are exact within the float
//! tolerance.

use stockbook_core::{DomainError, DomainResult};

use crate::unit::{Unit, UnitScheme};

fn usable_factor(factor: Option<f64>) -> DomainResult<f64> {
    match factor {
        None => Err(DomainError::invalid_conversion(
            "no conversion factor configured",
        )),
        Some(f) if !f.is_finite() => Err(DomainError::invalid_conversion(
            "conversion factor must be finite",
        )),
        Some(f) if f <= 0.0 => Err(DomainError::invalid_conversion(format!(
            "conversion factor must be positive, got {f}"
        ))),
        Some(f) => Ok(f),
    }
}

/// Primary-unit quantity → secondary-unit quantity.
pub fn to_secondary(primary_qty: f64, factor: Option<f64>) -> DomainResult<f64> {
    Ok(primary_qty * usable_factor(factor)?)
}

/// Secondary-unit quantity → primary-unit quantity.
pub fn to_primary(secondary_qty: f64, factor: Option<f64>) -> DomainResult<f64> {
    Ok(secondary_qty / usable_factor(factor)?)
}

/// Convert `quantity` from `from` to `to` under `scheme`.
///
/// Same unit on both sides returns the quantity unchanged, even without a
/// configured factor. Units outside the scheme are rejected.
pub fn convert(quantity: f64, from: &Unit, to: &Unit, scheme: &UnitScheme) -> DomainResult<f64> {
    if from.same_as(to) {
        return Ok(quantity);
    }

    let factor = scheme.secondary.as_ref().map(|s| s.factor);
    let secondary = scheme.secondary.as_ref().map(|s| &s.unit);

    if from.same_as(&scheme.primary) && secondary.is_some_and(|s| to.same_as(s)) {
        return to_secondary(quantity, factor);
    }
    if to.same_as(&scheme.primary) && secondary.is_some_and(|s| from.same_as(s)) {
        return to_primary(quantity, factor);
    }

    Err(DomainError::invalid_conversion(format!(
        "cannot convert {} -> {}: units are not part of this item's scheme",
        from.code, to.code
    )))
}
