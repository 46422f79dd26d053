//! # Repository Module
//!
//! Row-level access for Stockwise tables.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Services (cart, checkout, ledger, workflow)                            │
//! │       │                                                                 │
//! │       │  pub(crate) helpers taking &mut SqliteConnection               │
//! │       │  (so they run inside the caller's transaction)                 │
//! │       ▼                                                                 │
//! │  Repositories                                                          │
//! │  ├── ItemRepository          catalogue CRUD, SKU generation            │
//! │  ├── OrderRepository         orders, status machine, payment flag      │
//! │  ├── GrnRepository           receipt headers and lines (read side)     │
//! │  └── InventoryLogRepository  append-only stock audit trail             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of the public repository methods write `items.stock_quantity`.

pub mod grn;
pub mod inventory_log;
pub mod item;
pub mod order;

pub use grn::GrnRepository;
pub use inventory_log::InventoryLogRepository;
pub use item::ItemRepository;
pub use order::OrderRepository;
