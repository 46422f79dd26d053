//! # Order Repository
//!
//! Placed orders and their frozen lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (CheckoutService, one transaction)                           │
//! │     └── insert_order() → Order { status: item_processing }             │
//! │     └── debit + insert_order_item() per cart line                      │
//! │                                                                         │
//! │  2. FULFIL                                                             │
//! │     └── update_status(OutForDelivery) → update_status(Delivered)       │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL from any non-terminal status                     │
//! │     └── stock is NOT returned                                          │
//! │                                                                         │
//! │  mark_paid() is independent of status.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use stockwise_core::{CoreError, Order, OrderItem, OrderStatus};

use crate::error::{DbResult, LedgerError, LedgerResult};

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Lines of an order in the sequence they were written.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY rowid",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// A user's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Moves an order along its state machine.
    ///
    /// The current status is re-checked in the `WHERE` clause, so two staff
    /// members racing (deliver vs cancel) cannot both win.
    ///
    /// ## Returns
    /// * `Ok(Order)` - Updated order
    /// * `Err(Domain(InvalidOrderTransition))` - Not reachable from the current status
    /// * `Err(Domain(NotFound))`
    pub async fn update_status(&self, order_id: &str, next: OrderStatus) -> LedgerResult<Order> {
        let allowed = OrderStatus::predecessors(next);
        debug!(order_id = %order_id, to = %next.as_str(), "Updating order status");

        let updated = if allowed.is_empty() {
            None
        } else {
            let placeholders = (0..allowed.len())
                .map(|i| format!("?{}", i + 4))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE orders SET status = ?1, updated_at = ?2 \
                 WHERE id = ?3 AND status IN ({placeholders}) RETURNING *"
            );

            let mut query = sqlx::query_as::<_, Order>(&sql)
                .bind(next)
                .bind(Utc::now())
                .bind(order_id);
            for status in &allowed {
                query = query.bind(*status);
            }
            query.fetch_optional(&self.pool).await?
        };

        match updated {
            Some(order) => {
                info!(order_id = %order.id, status = %order.status.as_str(), "Order status updated");
                Ok(order)
            }
            None => {
                let current = self
                    .get(order_id)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("Order", order_id))?;
                Err(CoreError::InvalidOrderTransition {
                    order_id: order_id.to_string(),
                    from: current.status,
                    to: next,
                }
                .into())
            }
        }
    }

    /// Records payment. Allowed in any status; idempotent.
    pub async fn mark_paid(&self, order_id: &str) -> LedgerResult<Order> {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET is_paid = 1, updated_at = ?2 WHERE id = ?1 RETURNING *",
        )
        .bind(order_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| LedgerError::not_found("Order", order_id))
    }
}

pub(crate) async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, user_id, status, is_paid, total_amount, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(order.status)
    .bind(order.is_paid)
    .bind(order.total_amount)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn insert_order_item(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, item_id, sku_snapshot, name_snapshot,
            quantity, unit_price, line_total, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.item_id)
    .bind(&item.sku_snapshot)
    .bind(&item.name_snapshot)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.line_total)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockwise_core::Money;
    use uuid::Uuid;

    async fn placed(db: &Database) -> Order {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            status: OrderStatus::ItemProcessing,
            is_paid: false,
            total_amount: Money::from_cents(1000),
            created_at: now,
            updated_at: now,
        };
        let mut conn = db.pool().acquire().await.unwrap();
        insert_order(&mut *conn, &order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_status_walk() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = placed(&db).await;

        let shipped = db.orders().update_status(&order.id, OrderStatus::OutForDelivery).await.unwrap();
        assert_eq!(shipped.status, OrderStatus::OutForDelivery);

        let delivered = db.orders().update_status(&order.id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let err = db.orders().update_status(&order.id, OrderStatus::Cancelled).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::InvalidOrderTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled,
                ..
            })
        ));
        assert_eq!(err.to_string(), format!("Order {} cannot move from Delivered to Cancelled", order.id));
    }

    #[tokio::test]
    async fn test_back_to_processing_is_invalid() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = placed(&db).await;

        assert!(matches!(
            db.orders().update_status(&order.id, OrderStatus::ItemProcessing).await,
            Err(LedgerError::Domain(CoreError::InvalidOrderTransition { .. }))
        ));
        assert!(matches!(
            db.orders().update_status("missing", OrderStatus::Delivered).await,
            Err(LedgerError::Domain(CoreError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_mark_paid_independent_of_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = placed(&db).await;
        db.orders().update_status(&order.id, OrderStatus::Cancelled).await.unwrap();

        let paid = db.orders().mark_paid(&order.id).await.unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.status, OrderStatus::Cancelled);

        assert_eq!(db.orders().list_for_user("user-1").await.unwrap().len(), 1);
    }
}
