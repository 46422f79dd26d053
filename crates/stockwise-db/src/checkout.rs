//! # Checkout
//!
//! Turns a user's cart into a placed order.
//!
//! ## Transaction
//! ```text
//! read cart lines (outside the transaction)
//!      │
//! BEGIN
//!      ├── INSERT order header (status item_processing, total 0)
//!      ├── for each line:
//!      │     ├── ledger debit (conditional UPDATE, re-checks stock)
//!      │     └── INSERT order_item (sku, name, price frozen from item)
//!      ├── UPDATE order total
//!      └── DELETE the cart lines that were read
//! COMMIT
//!
//! Any failure (InsufficientStock included) → ROLLBACK: no debits, no order,
//! cart untouched.
//! ```
//!
//! The header insert comes first so the transaction holds the write lock
//! before it reads anything.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use stockwise_core::{CartLine, Money, Order, OrderItem, OrderStatus, ValidationError};

use crate::error::LedgerResult;
use crate::ledger;
use crate::repository::{item, order};

/// A committed order with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Places an order for everything in the user's cart.
    ///
    /// ## Returns
    /// * `Ok(PlacedOrder)` - All lines debited, cart emptied
    /// * `Err(Domain(Validation(Required { field: "cart" })))` - Cart is empty
    /// * `Err(Domain(InsufficientStock))` - A line no longer fits; nothing changed
    /// * `Err(Domain(ItemDisabled))` - A line's item was withdrawn
    /// * `Err(Domain(Validation(InvalidLine)))` - A line or the order total
    ///   does not fit in i64 cents
    pub async fn checkout(&self, user_id: &str) -> LedgerResult<PlacedOrder> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT * FROM cart_lines WHERE user_id = ?1 ORDER BY created_at, rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if lines.is_empty() {
            return Err(ValidationError::required("cart").into());
        }

        debug!(user_id = %user_id, lines = lines.len(), "Starting checkout");

        let now = Utc::now();
        let mut placed = Order {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            status: OrderStatus::ItemProcessing,
            is_paid: false,
            total_amount: Money::zero(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;
        order::insert_order(&mut tx, &placed).await?;

        let mut items = Vec::with_capacity(lines.len());
        let mut total = Money::zero();
        for (index, line) in lines.iter().enumerate() {
            if let Err(err) = ledger::debit_in(&mut tx, &line.item_id, line.quantity).await {
                warn!(user_id = %user_id, item_id = %line.item_id, error = %err, "Checkout aborted");
                return Err(err);
            }

            let stocked = item::fetch_required(&mut *tx, &line.item_id).await?;
            let too_large = |reason: &str| ValidationError::InvalidLine {
                line: index + 1,
                reason: reason.to_string(),
            };
            let line_total = stocked
                .selling_price
                .checked_times(line.quantity)
                .ok_or_else(|| too_large("line total is too large"))?;
            total = total
                .checked_add(line_total)
                .ok_or_else(|| too_large("order total is too large"))?;

            let order_item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: placed.id.clone(),
                item_id: stocked.id,
                sku_snapshot: stocked.sku,
                name_snapshot: stocked.name,
                quantity: line.quantity,
                unit_price: stocked.selling_price,
                line_total,
                created_at: now,
            };
            order::insert_order_item(&mut tx, &order_item).await?;
            items.push(order_item);
        }

        placed.total_amount = total;
        sqlx::query("UPDATE orders SET total_amount = ?1 WHERE id = ?2")
            .bind(placed.total_amount)
            .bind(&placed.id)
            .execute(&mut *tx)
            .await?;

        for line in &lines {
            sqlx::query("DELETE FROM cart_lines WHERE id = ?1")
                .bind(&line.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            order_id = %placed.id,
            user_id = %user_id,
            lines = items.len(),
            total = %placed.total_amount,
            "Order placed"
        );

        Ok(PlacedOrder { order: placed, items })
    }
}
