//! # Stock Ledger
//!
//! The only component that writes `items.stock_quantity`.
//!
//! ## Debit: one conditional statement
//! ```text
//! UPDATE items
//!    SET stock_quantity = stock_quantity - :qty
//!  WHERE id = :id
//!    AND disabled = 0
//!    AND stock_quantity >= :qty          ◄── re-checked at write time
//!    AND (is_loose = 1 OR :qty % 100 = 0)
//! RETURNING stock_quantity
//!
//! 1 row  → debited
//! 0 rows → look the item up once to say why:
//!          missing → NotFound, disabled → ItemDisabled,
//!          fractional on discrete → NotWholeNumber, else InsufficientStock
//! ```
//!
//! Two concurrent debits serialize on SQLite's write lock; the second sees
//! the first one's result in its `WHERE`, so stock can never go negative.
//!
//! ## Credit
//! Unconditional increment, optional cost/selling price refresh, and one
//! `inventory_logs` row, in the caller's transaction. A failed log insert
//! rolls the increment back with it.
//!
//! Both have `*_in` variants taking an open connection, used by checkout
//! and GRN approval to compose several ledger writes into one transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use stockwise_core::{CoreError, InventoryLogEntry, Money, Quantity, ValidationError};

use crate::error::{LedgerError, LedgerResult};
use crate::repository::{inventory_log, item};

/// Reason recorded for credits that are not goods receipts.
pub const REASON_STOCK_ADJUSTMENT: &str = "stock_adjustment";

// =============================================================================
// Credit Request
// =============================================================================

/// Everything a credit writes: the increment, price refresh and audit row.
#[derive(Debug, Clone)]
pub struct StockCredit {
    pub item_id: String,
    pub quantity: Quantity,
    /// Latest unit cost, replaces the item's cost basis when set.
    pub cost_price: Option<Money>,
    pub selling_price: Option<Money>,
    pub reason: String,
    pub reference_id: Option<String>,
    pub actor_id: String,
}

impl StockCredit {
    pub fn new(item_id: impl Into<String>, quantity: Quantity, actor_id: impl Into<String>) -> Self {
        StockCredit {
            item_id: item_id.into(),
            quantity,
            cost_price: None,
            selling_price: None,
            reason: REASON_STOCK_ADJUSTMENT.to_string(),
            reference_id: None,
            actor_id: actor_id.into(),
        }
    }

    pub fn cost_price(mut self, price: Money) -> Self {
        self.cost_price = Some(price);
        self
    }

    pub fn selling_price(mut self, price: Option<Money>) -> Self {
        self.selling_price = price;
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn reference(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Standalone ledger operations, one transaction each.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Debits `quantity` from an item. Returns the remaining stock.
    ///
    /// ## Returns
    /// * `Ok(remaining)` - Stock was at least `quantity`
    /// * `Err(Domain(InsufficientStock))` - Not enough on hand at write time
    /// * `Err(Domain(NotFound | ItemDisabled))`
    pub async fn debit(&self, item_id: &str, quantity: Quantity) -> LedgerResult<Quantity> {
        let mut tx = self.pool.begin().await?;
        let remaining = debit_in(&mut tx, item_id, quantity).await?;
        tx.commit().await?;
        Ok(remaining)
    }

    /// Credits stock and appends one inventory log entry.
    pub async fn credit(&self, credit: StockCredit) -> LedgerResult<InventoryLogEntry> {
        let mut tx = self.pool.begin().await?;
        let entry = credit_in(&mut tx, &credit).await?;
        tx.commit().await?;

        info!(
            item_id = %entry.item_id,
            delta = %entry.delta,
            new_quantity = %entry.new_quantity,
            reason = %entry.reason,
            "Stock credited"
        );
        Ok(entry)
    }
}

/// Debits inside an open transaction. See the module docs for the statement.
pub(crate) async fn debit_in(
    conn: &mut SqliteConnection,
    item_id: &str,
    quantity: Quantity,
) -> LedgerResult<Quantity> {
    if !quantity.is_positive() {
        return Err(ValidationError::must_be_positive("quantity").into());
    }

    debug!(item_id = %item_id, quantity = %quantity, "Debiting stock");

    let remaining: Option<Quantity> = sqlx::query_scalar(
        r#"
        UPDATE items
        SET stock_quantity = stock_quantity - ?1,
            updated_at = ?2
        WHERE id = ?3
          AND disabled = 0
          AND stock_quantity >= ?1
          AND (is_loose = 1 OR ?1 % 100 = 0)
        RETURNING stock_quantity
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(remaining) = remaining {
        return Ok(remaining);
    }

    let item = item::fetch_required(&mut *conn, item_id).await?;
    let err = if item.disabled {
        CoreError::ItemDisabled { sku: item.sku }
    } else if !item.is_loose && !quantity.is_whole() {
        ValidationError::NotWholeNumber {
            field: "quantity".to_string(),
            value: quantity,
        }
        .into()
    } else {
        warn!(
            item_id = %item_id,
            available = %item.stock_quantity,
            requested = %quantity,
            "Debit rejected, insufficient stock"
        );
        CoreError::InsufficientStock {
            sku: item.sku,
            unit: item.unit,
            available: item.stock_quantity,
            requested: quantity,
        }
    };
    Err(LedgerError::Domain(err))
}

/// Credits inside an open transaction and writes the log entry.
pub(crate) async fn credit_in(
    conn: &mut SqliteConnection,
    credit: &StockCredit,
) -> LedgerResult<InventoryLogEntry> {
    if !credit.quantity.is_positive() {
        return Err(ValidationError::must_be_positive("quantity").into());
    }

    debug!(item_id = %credit.item_id, quantity = %credit.quantity, "Crediting stock");

    let now = Utc::now();
    let new_quantity: Option<Quantity> = sqlx::query_scalar(
        r#"
        UPDATE items
        SET stock_quantity = stock_quantity + ?1,
            cost_price = COALESCE(?2, cost_price),
            selling_price = COALESCE(?3, selling_price),
            updated_at = ?4
        WHERE id = ?5
          AND (is_loose = 1 OR ?1 % 100 = 0)
        RETURNING stock_quantity
        "#,
    )
    .bind(credit.quantity)
    .bind(credit.cost_price)
    .bind(credit.selling_price)
    .bind(now)
    .bind(&credit.item_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(new_quantity) = new_quantity else {
        // exists but discrete: the quantity was fractional
        item::fetch_required(&mut *conn, &credit.item_id).await?;
        return Err(ValidationError::NotWholeNumber {
            field: "quantity".to_string(),
            value: credit.quantity,
        }
        .into());
    };

    let entry = InventoryLogEntry {
        id: Uuid::new_v4().to_string(),
        item_id: credit.item_id.clone(),
        delta: credit.quantity,
        previous_quantity: new_quantity - credit.quantity,
        new_quantity,
        reason: credit.reason.clone(),
        reference_id: credit.reference_id.clone(),
        actor_id: credit.actor_id.clone(),
        created_at: now,
    };
    inventory_log::insert(&mut *conn, &entry).await?;

    Ok(entry)
}

// =============================================================================
// Unit Tests
// =============================================================================
