//! # Validation Module
//!
//! Field-level validation for Stockwise inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP / UI)                                           │
//! │  └── Deserialization into NewItem / NewGrn / GrnLineInput              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, formats                                 │
//! │  ├── Item quantity-policy shape (step > 0 when loose, ...)             │
//! │  └── Receipt lines (non-empty, positive qty and price)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_quantity >= 0)                                       │
//! │  ├── UNIQUE (sku), UNIQUE (barcode), UNIQUE (grn_number)               │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockwise_core::validation::{validate_sku, validate_name};
//!
//! validate_sku("SUG-LOOSE").unwrap();
//! validate_name("Brown sugar").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{receipt_total, GrnLineInput, GrnLineItem, ItemUpdate, NewGrn, NewItem, NewItemSpec};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_SKU_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_UNIT_LEN: usize = 20;
const MAX_REFERENCE_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 1000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use stockwise_core::validation::validate_sku;
///
/// assert!(validate_sku("GRA-38412907-0421").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = required("sku", sku)?;
    max_len("sku", sku, MAX_SKU_LEN)?;

    if !sku.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode: digits only, 8 to 14 long (EAN-8 through GTIN-14).
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = required("barcode", barcode)?;
    if !(8..=14).contains(&barcode.len()) || !barcode.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must be 8 to 14 digits".to_string(),
        });
    }
    Ok(())
}

pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = required("name", name)?;
    max_len("name", name, MAX_NAME_LEN)
}

pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = required("unit", unit)?;
    max_len("unit", unit, MAX_UNIT_LEN)
}

fn required<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value)
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn optional_max_len(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => max_len(field, v, max),
        None => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use stockwise_core::validation::validate_price;
/// use stockwise_core::Money;
///
/// assert!(validate_price("cost_price", Money::from_cents(1099)).is_ok());
/// assert!(validate_price("cost_price", Money::zero()).is_ok());
/// assert!(validate_price("cost_price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates the quantity-policy fields of an item.
///
/// ## Rules
/// - `min_order_quantity` and `reorder_level` are never negative
/// - Loose items need `increment_step > 0`
/// - Discrete items need whole `min_order_quantity` and `reorder_level`
pub fn validate_item_policy(
    is_loose: bool,
    min_order_quantity: Quantity,
    increment_step: Quantity,
    reorder_level: Quantity,
) -> ValidationResult<()> {
    if min_order_quantity.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "min_order_quantity".to_string(),
        });
    }
    if reorder_level.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "reorder_level".to_string(),
        });
    }

    if is_loose {
        if !increment_step.is_positive() {
            return Err(ValidationError::must_be_positive("increment_step"));
        }
        return Ok(());
    }

    for (field, value) in [
        ("min_order_quantity", min_order_quantity),
        ("reorder_level", reorder_level),
    ] {
        if !value.is_whole() {
            return Err(ValidationError::NotWholeNumber {
                field: field.to_string(),
                value,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates an item-creation input.
pub fn validate_new_item(item: &NewItem) -> ValidationResult<()> {
    if let Some(sku) = &item.sku {
        validate_sku(sku)?;
    }
    if let Some(barcode) = &item.barcode {
        validate_barcode(barcode)?;
    }
    validate_name(&item.name)?;
    optional_max_len("category", item.category.as_deref(), MAX_NAME_LEN)?;
    validate_unit(&item.unit)?;
    validate_item_policy(
        item.is_loose,
        item.min_order_quantity,
        item.increment_step,
        item.reorder_level,
    )?;
    validate_price("cost_price", item.cost_price)?;
    if let Some(selling) = item.selling_price {
        validate_price("selling_price", selling)?;
    }
    Ok(())
}

/// Validates an item update.
pub fn validate_item_update(update: &ItemUpdate) -> ValidationResult<()> {
    if let Some(barcode) = &update.barcode {
        validate_barcode(barcode)?;
    }
    validate_name(&update.name)?;
    optional_max_len("category", update.category.as_deref(), MAX_NAME_LEN)?;
    validate_unit(&update.unit)?;
    validate_item_policy(
        update.is_loose,
        update.min_order_quantity,
        update.increment_step,
        update.reorder_level,
    )?;
    validate_price("cost_price", update.cost_price)?;
    validate_price("selling_price", update.selling_price)
}

/// Validates a goods receipt header.
pub fn validate_grn_header(header: &NewGrn) -> ValidationResult<()> {
    required("supplier_id", &header.supplier_id)?;
    required("received_by", &header.received_by)?;
    optional_max_len("po_reference", header.po_reference.as_deref(), MAX_REFERENCE_LEN)?;
    optional_max_len("notes", header.notes.as_deref(), MAX_NOTES_LEN)
}

/// Validates goods receipt lines.
///
/// Lines are numbered from 1 in errors. Whole-number checks for existing
/// items need the stored item and happen when the receipt is created.
pub fn validate_grn_lines(lines: &[GrnLineInput]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyReceipt);
    }

    for (index, line) in lines.iter().enumerate() {
        let number = index + 1;
        let invalid = |reason: String| ValidationError::InvalidLine {
            line: number,
            reason,
        };

        match &line.item {
            GrnLineItem::Existing { item_id } => {
                if item_id.trim().is_empty() {
                    return Err(invalid("item reference is required".to_string()));
                }
            }
            GrnLineItem::New(spec) => {
                validate_new_item_spec(spec).map_err(|e| invalid(e.to_string()))?;
                if !spec.is_loose && !line.received_quantity.is_whole() {
                    return Err(invalid(format!(
                        "received quantity must be a whole number, got {}",
                        line.received_quantity
                    )));
                }
            }
        }

        if !line.received_quantity.is_positive() {
            return Err(invalid("received quantity must be positive".to_string()));
        }
        if !line.unit_price.is_positive() {
            return Err(invalid("unit price must be positive".to_string()));
        }
        if line.selling_price.is_some_and(|p| p.is_negative()) {
            return Err(invalid("selling price must not be negative".to_string()));
        }
    }

    receipt_total(lines).map(|_| ())
}

/// A new item described on a receipt line is complete when name, category
/// and unit are present.
pub fn validate_new_item_spec(spec: &NewItemSpec) -> ValidationResult<()> {
    validate_name(&spec.name)?;
    required("category", &spec.category)?;
    validate_unit(&spec.unit)?;
    if let Some(sku) = &spec.sku {
        validate_sku(sku)?;
    }
    if let Some(barcode) = &spec.barcode {
        validate_barcode(barcode)?;
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use stockwise_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    required("id", id)?;

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rice_spec() -> NewItemSpec {
        NewItemSpec {
            name: "Basmati rice".to_string(),
            category: "Grains".to_string(),
            sku: None,
            barcode: None,
            unit: "kg".to_string(),
            is_loose: true,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SUG-LOOSE").is_ok());
        assert!(validate_sku("item_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("4006381333931").is_ok());
        assert!(validate_barcode("1234").is_err());
        assert!(validate_barcode("40063813339X1").is_err());
    }

    #[test]
    fn test_validate_item_policy() {
        let q = Quantity::from_units;

        assert!(validate_item_policy(true, q(50), q(10), q(100)).is_ok());
        assert!(matches!(
            validate_item_policy(true, q(50), Quantity::zero(), q(0)),
            Err(ValidationError::MustBePositive { .. })
        ));

        assert!(validate_item_policy(false, q(1), q(1), q(5)).is_ok());
        assert!(matches!(
            validate_item_policy(false, Quantity::from_hundredths(150), q(1), q(0)),
            Err(ValidationError::NotWholeNumber { .. })
        ));
        assert!(validate_item_policy(false, q(-1), q(1), q(0)).is_err());
    }

    #[test]
    fn test_validate_new_item() {
        let item = NewItem::discrete("Blue pen", Money::from_cents(150)).with_sku("PEN-BLUE");
        assert!(validate_new_item(&item).is_ok());

        let mut bad = item.clone();
        bad.name = " ".to_string();
        assert_eq!(validate_new_item(&bad), Err(ValidationError::required("name")));

        let mut negative = item;
        negative.selling_price = Some(Money::from_cents(-1));
        assert!(validate_new_item(&negative).is_err());
    }

    #[test]
    fn test_validate_grn_header() {
        let header = NewGrn {
            supplier_id: "sup-1".to_string(),
            po_reference: Some("PO-77".to_string()),
            received_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            received_by: "user-1".to_string(),
            notes: None,
        };
        assert!(validate_grn_header(&header).is_ok());

        let missing = NewGrn {
            supplier_id: String::new(),
            ..header
        };
        assert_eq!(validate_grn_header(&missing), Err(ValidationError::required("supplier_id")));
    }

    #[test]
    fn test_validate_grn_lines_empty() {
        assert_eq!(validate_grn_lines(&[]), Err(ValidationError::EmptyReceipt));
    }

    #[test]
    fn test_validate_grn_lines_rules() {
        let good = GrnLineInput::existing("item-1", Quantity::from_units(5), Money::from_cents(200));
        assert!(validate_grn_lines(std::slice::from_ref(&good)).is_ok());

        let zero_price = GrnLineInput {
            unit_price: Money::zero(),
            ..good.clone()
        };
        assert!(matches!(
            validate_grn_lines(&[good.clone(), zero_price]),
            Err(ValidationError::InvalidLine { line: 2, .. })
        ));

        let zero_qty = GrnLineInput {
            received_quantity: Quantity::zero(),
            ..good.clone()
        };
        assert!(validate_grn_lines(&[zero_qty]).is_err());

        let blank_ref = GrnLineInput::existing(" ", Quantity::from_units(1), Money::from_cents(1));
        assert!(validate_grn_lines(&[blank_ref]).is_err());

        let priceless = GrnLineInput::existing(
            "item-2",
            Quantity::from_units(1_000_000),
            Money::from_cents(100_000_000_000_000),
        );
        assert_eq!(
            validate_grn_lines(&[good, priceless]),
            Err(ValidationError::InvalidLine {
                line: 2,
                reason: "line total is too large".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_grn_lines_new_item() {
        let rice = GrnLineInput::new_item(rice_spec(), "12.5".parse().unwrap(), Money::from_cents(399));
        assert!(validate_grn_lines(&[rice]).is_ok());

        let incomplete = NewItemSpec {
            category: String::new(),
            ..rice_spec()
        };
        let line = GrnLineInput::new_item(incomplete, Quantity::from_units(1), Money::from_cents(1));
        assert!(matches!(
            validate_grn_lines(&[line]),
            Err(ValidationError::InvalidLine { line: 1, .. })
        ));

        let discrete = NewItemSpec {
            is_loose: false,
            ..rice_spec()
        };
        let fractional = GrnLineInput::new_item(discrete, "2.5".parse().unwrap(), Money::from_cents(1));
        assert!(validate_grn_lines(&[fractional]).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
