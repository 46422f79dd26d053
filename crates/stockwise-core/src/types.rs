//! # Domain Types
//!
//! Core domain types used throughout Stockwise.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │    CartLine     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, sku        │   │  (user, item)   │   │  status         │       │
//! │  │  is_loose       │   │  quantity       │   │  is_paid        │       │
//! │  │  min / step     │   │                 │   │  OrderItem[]    │       │
//! │  │  stock_quantity │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Grn        │   │    GrnLine      │   │ InventoryLog    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  grn_number     │   │  item_id        │   │  delta          │       │
//! │  │  status         │   │  received_qty   │   │  previous / new │       │
//! │  │  total_amount   │   │  unit_price     │   │  reason, actor  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, grn_number) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Item
// =============================================================================

/// A sellable, stockable unit.
///
/// `stock_quantity` is never written through this type; the Stock Ledger
/// owns every change to it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - unique, human-facing.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.), unique when present.
    pub barcode: Option<String>,

    pub name: String,

    pub category: Option<String>,

    /// Display unit ("g", "kg", "pcs").
    pub unit: String,

    /// Sold by continuous measure (weight/volume) rather than count.
    pub is_loose: bool,

    /// Smallest orderable quantity for loose items.
    pub min_order_quantity: Quantity,

    /// Granularity above the minimum for loose items.
    pub increment_step: Quantity,

    /// Current on-hand stock. Never negative.
    pub stock_quantity: Quantity,

    /// Low-stock threshold.
    pub reorder_level: Quantity,

    /// Latest cost basis (refreshed by goods receipts).
    pub cost_price: Money,

    pub selling_price: Money,

    /// Soft-delete flag. Disabled items stay referenced by history.
    pub disabled: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Checks if stock has fallen to or below the reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }

    /// Checks if the requested quantity is currently on hand.
    pub fn has_stock_for(&self, quantity: Quantity) -> bool {
        quantity <= self.stock_quantity
    }
}

/// Input for creating an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    /// Explicit SKU. Generated from the category when absent.
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub unit: String,
    #[serde(default)]
    pub is_loose: bool,
    pub min_order_quantity: Quantity,
    pub increment_step: Quantity,
    #[serde(default)]
    pub reorder_level: Quantity,
    pub cost_price: Money,
    /// Defaults to `cost_price` when absent.
    #[serde(default)]
    pub selling_price: Option<Money>,
}

impl NewItem {
    /// A discrete item counted in pieces, min 1, step 1.
    pub fn discrete(name: impl Into<String>, cost_price: Money) -> Self {
        NewItem {
            sku: None,
            barcode: None,
            name: name.into(),
            category: None,
            unit: "pcs".to_string(),
            is_loose: false,
            min_order_quantity: Quantity::from_units(1),
            increment_step: Quantity::from_units(1),
            reorder_level: Quantity::zero(),
            cost_price,
            selling_price: None,
        }
    }

    /// A loose item sold by measure.
    pub fn loose(
        name: impl Into<String>,
        unit: impl Into<String>,
        min_order_quantity: Quantity,
        increment_step: Quantity,
        cost_price: Money,
    ) -> Self {
        NewItem {
            sku: None,
            barcode: None,
            name: name.into(),
            category: None,
            unit: unit.into(),
            is_loose: true,
            min_order_quantity,
            increment_step,
            reorder_level: Quantity::zero(),
            cost_price,
            selling_price: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }
}

/// Editable item fields. Stock is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub is_loose: bool,
    pub min_order_quantity: Quantity,
    pub increment_step: Quantity,
    pub reorder_level: Quantity,
    pub cost_price: Money,
    pub selling_price: Money,
}

impl From<&Item> for ItemUpdate {
    fn from(item: &Item) -> Self {
        ItemUpdate {
            name: item.name.clone(),
            barcode: item.barcode.clone(),
            category: item.category.clone(),
            unit: item.unit.clone(),
            is_loose: item.is_loose,
            min_order_quantity: item.min_order_quantity,
            increment_step: item.increment_step,
            reorder_level: item.reorder_level,
            cost_price: item.cost_price,
            selling_price: item.selling_price,
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One (user, item) pair in a user's draft order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub quantity: Quantity,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Status of a placed order.
///
/// ## State Machine
/// ```text
/// item_processing ──► out_for_delivery ──► delivered (terminal)
///        │                   │
///        └───────────────────┴──────────► cancelled (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    ItemProcessing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and Cancelled accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Checks whether `self → next` is a legal move.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (ItemProcessing, OutForDelivery)
                | (ItemProcessing, Delivered)
                | (ItemProcessing, Cancelled)
                | (OutForDelivery, Delivered)
                | (OutForDelivery, Cancelled)
        )
    }

    /// Statuses from which `next` may be reached (used for conditional updates).
    pub fn predecessors(next: OrderStatus) -> Vec<OrderStatus> {
        [
            OrderStatus::ItemProcessing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ]
        .into_iter()
        .filter(|s| s.can_transition_to(next))
        .collect()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::ItemProcessing => "item_processing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::ItemProcessing => "Item Processing",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order. Immutable apart from status and the payment flag.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A line of a placed order.
/// Uses snapshot pattern to freeze item data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub item_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Item name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: Quantity,
    /// Selling price at time of sale (frozen).
    pub unit_price: Money,
    pub line_total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// GRN Status
// =============================================================================

/// Status of a goods receipt note.
///
/// ## State Machine
/// ```text
///            ┌──► approved (terminal, stock credited once)
/// pending ───┤
///            └──► rejected (terminal, no stock change)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum GrnStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl GrnStatus {
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, GrnStatus::Pending)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            GrnStatus::Pending => "pending",
            GrnStatus::Approved => "approved",
            GrnStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for GrnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only two ways out of `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrnDecision {
    Approve,
    Reject,
}

impl GrnDecision {
    /// The terminal status this decision moves a receipt into.
    pub const fn target_status(&self) -> GrnStatus {
        match self {
            GrnDecision::Approve => GrnStatus::Approved,
            GrnDecision::Reject => GrnStatus::Rejected,
        }
    }
}

impl TryFrom<GrnStatus> for GrnDecision {
    type Error = crate::error::ValidationError;

    fn try_from(status: GrnStatus) -> Result<Self, Self::Error> {
        match status {
            GrnStatus::Approved => Ok(GrnDecision::Approve),
            GrnStatus::Rejected => Ok(GrnDecision::Reject),
            GrnStatus::Pending => Err(crate::error::ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: "target must be approved or rejected".to_string(),
            }),
        }
    }
}

// =============================================================================
// Goods Receipt Note
// =============================================================================

/// GRN header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Grn {
    pub id: String,
    /// `GRN-{YYMMDD}-{seq:03}`, unique.
    pub grn_number: String,
    pub supplier_id: String,
    pub po_reference: Option<String>,
    #[ts(as = "String")]
    pub received_date: NaiveDate,
    pub received_by: String,
    pub notes: Option<String>,
    /// Σ(received_quantity × unit_price), fixed at creation.
    pub total_amount: Money,
    pub status: GrnStatus,
    /// Actor who approved or rejected the receipt.
    pub finalized_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub finalized_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// GRN detail line as stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct GrnLine {
    pub id: String,
    pub grn_id: String,
    pub item_id: String,
    pub received_quantity: Quantity,
    pub unit_price: Money,
    pub selling_price: Option<Money>,
    pub line_total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Header input for creating a GRN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGrn {
    pub supplier_id: String,
    #[serde(default)]
    pub po_reference: Option<String>,
    pub received_date: NaiveDate,
    pub received_by: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Which item a receipt line refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrnLineItem {
    /// An item already in the catalogue.
    Existing { item_id: String },
    /// An item first seen on this delivery; created with the receipt.
    New(NewItemSpec),
}

/// Catalogue entry for an item first received on a GRN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemSpec {
    pub name: String,
    pub category: String,
    /// Generated from the category when absent.
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub unit: String,
    #[serde(default)]
    pub is_loose: bool,
}

/// Line input for creating a GRN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrnLineInput {
    pub item: GrnLineItem,
    pub received_quantity: Quantity,
    pub unit_price: Money,
    #[serde(default)]
    pub selling_price: Option<Money>,
}

impl GrnLineInput {
    pub fn existing(item_id: impl Into<String>, received_quantity: Quantity, unit_price: Money) -> Self {
        GrnLineInput {
            item: GrnLineItem::Existing {
                item_id: item_id.into(),
            },
            received_quantity,
            unit_price,
            selling_price: None,
        }
    }

    pub fn new_item(spec: NewItemSpec, received_quantity: Quantity, unit_price: Money) -> Self {
        GrnLineInput {
            item: GrnLineItem::New(spec),
            received_quantity,
            unit_price,
            selling_price: None,
        }
    }

    /// Line total, rounded once to whole cents. `None` if it overflows.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_times(self.received_quantity)
    }
}

/// Computes a receipt total from its lines.
///
/// Fails with `InvalidLine` naming the first line whose total, or the
/// running sum up to it, no longer fits in i64 cents.
pub fn receipt_total(lines: &[GrnLineInput]) -> Result<Money, ValidationError> {
    lines.iter().enumerate().try_fold(Money::zero(), |sum, (index, line)| {
        let too_large = |reason: &str| ValidationError::InvalidLine {
            line: index + 1,
            reason: reason.to_string(),
        };
        let line_total = line.line_total().ok_or_else(|| too_large("line total is too large"))?;
        sum.checked_add(line_total)
            .ok_or_else(|| too_large("receipt total is too large"))
    })
}

// =============================================================================
// Inventory Log
// =============================================================================

/// Append-only audit record of a stock mutation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryLogEntry {
    pub id: String,
    pub item_id: String,
    pub delta: Quantity,
    pub previous_quantity: Quantity,
    pub new_quantity: Quantity,
    /// e.g. "goods_receipt"
    pub reason: String,
    /// GRN id for receipt credits.
    pub reference_id: Option<String>,
    pub actor_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Domain Events
// =============================================================================

/// Best-effort notifications published after a commit.
///
/// Serialized as `{"type": "grn-completed", "grnId": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[ts(export)]
pub enum DomainEvent {
    GrnCompleted {
        #[serde(rename = "grnId")]
        grn_id: String,
    },
    InventoryUpdated {
        #[serde(rename = "grnId")]
        grn_id: String,
    },
}

impl DomainEvent {
    pub fn grn_id(&self) -> &str {
        match self {
            DomainEvent::GrnCompleted { grn_id } | DomainEvent::InventoryUpdated { grn_id } => grn_id,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
