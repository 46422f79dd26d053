//! # Quantity Policy
//!
//! Decides whether a proposed quantity is legal for an item, and normalizes it.
//!
//! ## Rule Order
//! ```text
//! requested
//!    │
//!    ├─► ≤ 0 ?                         → MustBePositive
//!    │
//!    ├─► discrete and fractional ?     → NotWholeNumber
//!    │
//!    ├─► loose and < min ?             → BelowMinimum
//!    ├─► loose and (req-min) % step≠0? → OffIncrement
//!    │
//!    ├─► > stock ?                     → InsufficientStock
//!    │
//!    ▼
//! normalized quantity
//! ```
//!
//! Every function here is pure. The stock ceiling is only as fresh as the
//! `stock_quantity` handed in; the Stock Ledger re-checks it at mutation time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::quantity::Quantity;
use crate::types::Item;

// =============================================================================
// Policy Snapshot
// =============================================================================

/// The subset of an item that governs which quantities are legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityPolicy {
    pub sku: String,
    pub unit: String,
    pub is_loose: bool,
    pub min_order_quantity: Quantity,
    pub increment_step: Quantity,
    pub stock_quantity: Quantity,
}

impl From<&Item> for QuantityPolicy {
    fn from(item: &Item) -> Self {
        QuantityPolicy {
            sku: item.sku.clone(),
            unit: item.unit.clone(),
            is_loose: item.is_loose,
            min_order_quantity: item.min_order_quantity,
            increment_step: item.increment_step,
            stock_quantity: item.stock_quantity,
        }
    }
}

impl QuantityPolicy {
    /// Validates `requested` against this policy.
    ///
    /// ## Example
    /// ```rust
    /// use stockwise_core::policy::QuantityPolicy;
    /// use stockwise_core::Quantity;
    ///
    /// let sugar = QuantityPolicy {
    ///     sku: "SUG-LOOSE".into(),
    ///     unit: "g".into(),
    ///     is_loose: true,
    ///     min_order_quantity: Quantity::from_units(50),
    ///     increment_step: Quantity::from_units(10),
    ///     stock_quantity: Quantity::from_units(500),
    /// };
    ///
    /// assert!(sugar.validate(Quantity::from_units(65)).is_err());
    /// assert_eq!(sugar.validate(Quantity::from_units(70)).unwrap(), Quantity::from_units(70));
    /// ```
    pub fn validate(&self, requested: Quantity) -> CoreResult<Quantity> {
        self.check_shape(requested)?;

        if requested > self.stock_quantity {
            return Err(CoreError::InsufficientStock {
                sku: self.sku.clone(),
                unit: self.unit.clone(),
                available: self.stock_quantity,
                requested,
            });
        }

        Ok(requested)
    }

    /// Validates a raw float from an untyped caller.
    ///
    /// Discrete items reject any fractional input before rounding, so `2.001`
    /// pieces is an error rather than silently becoming `2`.
    pub fn validate_f64(&self, raw: f64) -> CoreResult<Quantity> {
        if !raw.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: "must be a finite number".to_string(),
            }
            .into());
        }

        let requested = Quantity::from_f64(raw).ok_or_else(|| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "is too large".to_string(),
        })?;

        if !self.is_loose && raw > 0.0 && raw.fract() != 0.0 {
            return Err(ValidationError::NotWholeNumber {
                field: "quantity".to_string(),
                value: requested,
            }
            .into());
        }

        self.validate(requested)
    }

    /// Checks every rule except the stock ceiling.
    ///
    /// Receipts use this: stock received is not bounded by stock on hand.
    pub fn check_shape(&self, requested: Quantity) -> Result<(), ValidationError> {
        if !requested.is_positive() {
            return Err(ValidationError::must_be_positive("quantity"));
        }

        if !self.is_loose {
            if !requested.is_whole() {
                return Err(ValidationError::NotWholeNumber {
                    field: "quantity".to_string(),
                    value: requested,
                });
            }
            return Ok(());
        }

        if requested < self.min_order_quantity {
            return Err(ValidationError::BelowMinimum {
                minimum: self.min_order_quantity,
                unit: self.unit.clone(),
                requested,
            });
        }

        if !self.on_increment(requested) {
            return Err(ValidationError::OffIncrement {
                minimum: self.min_order_quantity,
                step: self.increment_step,
                unit: self.unit.clone(),
                requested,
            });
        }

        Ok(())
    }

    /// Exact equality to the minimum is the zero'th increment.
    fn on_increment(&self, requested: Quantity) -> bool {
        let above_min = requested.hundredths() - self.min_order_quantity.hundredths();
        if above_min == 0 {
            return true;
        }
        let step = self.increment_step.hundredths();
        step > 0 && above_min % step == 0
    }
}

// =============================================================================
// Caller-Facing Result
// =============================================================================

/// Serializable outcome of a quantity check, for callers that want a value
/// instead of a `Result`.
///
/// ```text
/// { "ok": true,  "normalized": 70 }
/// { "ok": false, "reason": "Minimum order is 50 g, requested 40" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuantityCheck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<CoreResult<Quantity>> for QuantityCheck {
    fn from(result: CoreResult<Quantity>) -> Self {
        match result {
            Ok(normalized) => QuantityCheck {
                ok: true,
                normalized: Some(normalized),
                reason: None,
            },
            Err(err) => QuantityCheck {
                ok: false,
                normalized: None,
                reason: Some(err.to_string()),
            },
        }
    }
}

/// Validates `requested` against `item`'s policy and current stock.
pub fn validate_quantity(item: &Item, requested: Quantity) -> CoreResult<Quantity> {
    QuantityPolicy::from(item).validate(requested)
}

/// Same as [`validate_quantity`], reported as a [`QuantityCheck`].
pub fn check_quantity(item: &Item, requested: Quantity) -> QuantityCheck {
    validate_quantity(item, requested).into()
}

// =============================================================================
// Unit Tests
// =============================================================================
