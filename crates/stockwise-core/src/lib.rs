//! # stockwise-core: Pure Business Logic for Stockwise
//!
//! This crate holds the rules that keep on-hand stock consistent, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockwise Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP / UI layer (external collaborator)            │   │
//! │  │    cart endpoints ──► checkout ──► GRN create / approve         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockwise-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  policy   │  │ quantity  │  │   types   │  │ sequence  │  │   │
//! │  │   │ validate  │  │ Quantity  │  │ Item, GRN │  │ SKU / GRN │  │   │
//! │  │   │ lattice   │  │  Money    │  │ statuses  │  │  numbers  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         stockwise-db (Stock Ledger, Cart, GRN Workflow)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quantity`] - Fixed-point quantity (hundredths of a unit)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`policy`] - Quantity Policy: min order quantity, increment step, stock ceiling
//! - [`types`] - Domain types (Item, CartLine, Order, Grn, InventoryLogEntry)
//! - [`sequence`] - SKU and GRN number formatting
//! - [`validation`] - Field-level validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockwise_core::Quantity;
//!
//! // 12.5 kg, stored as 1250 hundredths
//! let qty: Quantity = "12.5".parse().unwrap();
//! assert_eq!(qty.hundredths(), 1250);
//! assert_eq!(qty.to_string(), "12.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod policy;
pub mod quantity;
pub mod sequence;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::{Quantity, QUANTITY_SCALE};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of times an identifier is regenerated after a uniqueness collision
/// before the operation fails permanently.
pub const DEFAULT_SEQUENCE_ATTEMPTS: u32 = 3;

/// Reason recorded on inventory log entries written by GRN approval.
pub const REASON_GOODS_RECEIPT: &str = "goods_receipt";
