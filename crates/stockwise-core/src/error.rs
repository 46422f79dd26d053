//! # Error Types
//!
//! Domain-specific error types for stockwise-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockwise-core errors (this file)                                     │
//! │  ├── CoreError        - Domain outcomes (stock, GRN state, orders)     │
//! │  └── ValidationError  - Input / quantity policy failures               │
//! │                                                                         │
//! │  stockwise-db errors (separate crate)                                  │
//! │  ├── DbError          - Storage failures                               │
//! │  └── LedgerError      - What services return (Domain | Persistence)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, unit, GRN number)
//! 3. Errors are enum variants, never String
//! 4. Each variant renders a message a shop assistant can act on

use thiserror::Error;

use crate::quantity::Quantity;
use crate::types::{GrnStatus, OrderStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// All of these are recoverable by the caller: re-query, refresh, re-prompt.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity does not exist (or is not visible to this operation).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Requested quantity exceeds on-hand stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5 g)
    ///      │
    ///      ▼
    /// Check stock: available = 4 g
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "SUG-LOOSE", unit: "g", available: 4, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "only 4 g available"
    /// ```
    #[error("Insufficient stock for {sku}: only {available} {unit} available, requested {requested}")]
    InsufficientStock {
        sku: String,
        unit: String,
        available: Quantity,
        requested: Quantity,
    },

    /// The goods receipt has already left `pending`.
    #[error("Goods receipt {grn_number} was already {status} by someone else")]
    AlreadyFinalized {
        grn_number: String,
        status: GrnStatus,
    },

    /// Order status change not allowed by the order state machine.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidOrderTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Item is disabled (soft-deleted) and cannot be sold.
    #[error("Item {sku} is no longer available")]
    ItemDisabled { sku: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Never retried automatically; the caller fixes the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, not a number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Discrete items are only sold and stocked in whole units.
    #[error("{field} must be a whole number, got {value}")]
    NotWholeNumber { field: String, value: Quantity },

    /// Loose item requested below its minimum order quantity.
    #[error("Minimum order is {minimum} {unit}, requested {requested}")]
    BelowMinimum {
        minimum: Quantity,
        unit: String,
        requested: Quantity,
    },

    /// Loose item requested off its increment lattice.
    #[error("Quantity must be {minimum} {unit} plus steps of {step}, requested {requested}")]
    OffIncrement {
        minimum: Quantity,
        step: Quantity,
        unit: String,
        requested: Quantity,
    },

    /// Duplicate value (e.g., duplicate SKU or barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A goods receipt must have at least one line.
    #[error("A goods receipt needs at least one line")]
    EmptyReceipt,

    /// A goods receipt line is incomplete or invalid.
    #[error("Receipt line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
