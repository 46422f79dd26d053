//! # stockwise-db: Storage, Stock Ledger and Workflows
//!
//! Everything in Stockwise that touches the database, and every transaction
//! boundary.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockwise Data Flow                              │
//! │                                                                         │
//! │  HTTP / UI layer (cart endpoints, GRN screens)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockwise-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   CartService ──► CheckoutService ──┐                           │   │
//! │  │                                     ├──► StockLedger            │   │
//! │  │   GrnWorkflow ──────────────────────┘    (debit / credit)       │   │
//! │  │        │                                      │                 │   │
//! │  │        ├── SequenceGenerator (GRN no., SKU)   │                 │   │
//! │  │        └── EventSink (after commit)           │                 │   │
//! │  │                                               ▼                 │   │
//! │  │   Repositories: items, orders, grns, inventory_logs             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) ./stockwise.db                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, service accessors
//! - [`config`] - `stockwise.toml` + environment overrides
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - `DbError`, `LedgerError`, error codes
//! - [`ledger`] - Stock Ledger, the only writer of `stock_quantity`
//! - [`cart`] - Draft order lines
//! - [`checkout`] - Cart to order, one transaction
//! - [`workflow`] - GRN creation and approval
//! - [`sequence`] - SKU / GRN number generation with collision retry
//! - [`events`] - Post-commit domain events
//! - [`repository`] - Row access
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockwise_db::{Database, StockwiseConfig};
//!
//! let config = StockwiseConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! db.carts().add_or_increment("user-1", &item_id, qty).await?;
//! let placed = db.checkout().checkout("user-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sequence;
pub mod workflow;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::{CartLineView, CartService};
pub use checkout::{CheckoutService, PlacedOrder};
pub use config::StockwiseConfig;
pub use error::{DbError, DbResult, ErrorCode, ErrorReport, LedgerError, LedgerResult};
pub use events::{BroadcastEventSink, EventSink, NoopEventSink};
pub use ledger::{StockCredit, StockLedger};
pub use pool::{Database, DbConfig};
pub use repository::{GrnRepository, InventoryLogRepository, ItemRepository, OrderRepository};
pub use sequence::SequenceGenerator;
pub use workflow::GrnWorkflow;
