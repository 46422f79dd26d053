//! # Cart Service
//!
//! Draft order lines per user. Quantities are validated against the item's
//! Quantity Policy, stock ceiling included, but nothing is reserved.
//!
//! ## Known Gap: No Reservation
//! ```text
//! stock = 100
//!
//! user A: add 60 ──► validate(60 ≤ 100) ✓ ──► cart A = 60
//! user B: add 60 ──► validate(60 ≤ 100) ✓ ──► cart B = 60    (both accepted)
//!
//! user A: checkout ──► debit 60 ✓ ──► stock = 40
//! user B: checkout ──► debit 60 ✗ InsufficientStock          (enforced here)
//! ```
//!
//! The checkout debit is the only stock guarantee. Concurrent writes to the
//! same (user, item) line are last-write-wins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use stockwise_core::policy::QuantityPolicy;
use stockwise_core::{CartLine, CoreError, Item, Money, Quantity};

use crate::error::{DbResult, LedgerResult};
use crate::repository::item;

/// A cart line joined with the item it refers to, priced at the current
/// selling price.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLineView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub line: CartLine,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub unit_price: Money,
    pub stock_quantity: Quantity,
    pub disabled: bool,
}

impl CartLineView {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.line.quantity)
    }

    /// False when the line could no longer be checked out as it stands.
    pub fn is_available(&self) -> bool {
        !self.disabled && self.line.quantity <= self.stock_quantity
    }
}

#[derive(Debug, Clone)]
pub struct CartService {
    pool: SqlitePool,
}

impl CartService {
    pub fn new(pool: SqlitePool) -> Self {
        CartService { pool }
    }

    /// Adds `quantity` to the user's line for `item_id`, creating it if needed.
    ///
    /// The resulting total is validated as a fresh quantity, so repeated adds
    /// cannot walk past stock or off the increment lattice.
    pub async fn add_or_increment(
        &self,
        user_id: &str,
        item_id: &str,
        quantity: Quantity,
    ) -> LedgerResult<CartLine> {
        let item = self.sellable_item(item_id).await?;
        let policy = QuantityPolicy::from(&item);
        policy.validate(quantity)?;

        let existing: Option<Quantity> =
            sqlx::query_scalar("SELECT quantity FROM cart_lines WHERE user_id = ?1 AND item_id = ?2")
                .bind(user_id)
                .bind(item_id)
                .fetch_optional(&self.pool)
                .await?;

        let total = match existing {
            Some(current) => policy.validate(current + quantity)?,
            None => quantity,
        };

        debug!(user_id = %user_id, item_id = %item_id, quantity = %total, "Adding to cart");
        self.upsert(user_id, item_id, total).await
    }

    /// Sets the line to an absolute quantity. Zero removes the line and
    /// returns `None`.
    pub async fn set_quantity(
        &self,
        user_id: &str,
        item_id: &str,
        quantity: Quantity,
    ) -> LedgerResult<Option<CartLine>> {
        if quantity.is_zero() {
            self.remove(user_id, item_id).await?;
            return Ok(None);
        }

        let item = self.sellable_item(item_id).await?;
        let quantity = QuantityPolicy::from(&item).validate(quantity)?;

        debug!(user_id = %user_id, item_id = %item_id, quantity = %quantity, "Setting cart quantity");
        self.upsert(user_id, item_id, quantity).await.map(Some)
    }

    /// Deletes the line. Returns whether a line existed; absence is not an error.
    pub async fn remove(&self, user_id: &str, item_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1 AND item_id = ?2")
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Empties a user's cart. Returns the number of lines removed.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        info!(user_id = %user_id, removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }

    /// The user's cart with item details, oldest line first.
    pub async fn lines(&self, user_id: &str) -> DbResult<Vec<CartLineView>> {
        let lines = sqlx::query_as::<_, CartLineView>(
            r#"
            SELECT
                c.id, c.user_id, c.item_id, c.quantity, c.created_at, c.updated_at,
                i.sku, i.name, i.unit,
                i.selling_price AS unit_price,
                i.stock_quantity, i.disabled
            FROM cart_lines c
            JOIN items i ON i.id = c.item_id
            WHERE c.user_id = ?1
            ORDER BY c.created_at, c.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    async fn sellable_item(&self, item_id: &str) -> LedgerResult<Item> {
        let item = item::fetch_required(&self.pool, item_id).await?;
        if item.disabled {
            return Err(CoreError::ItemDisabled { sku: item.sku }.into());
        }
        Ok(item)
    }

    async fn upsert(&self, user_id: &str, item_id: &str, quantity: Quantity) -> LedgerResult<CartLine> {
        let now: DateTime<Utc> = Utc::now();
        let line = sqlx::query_as::<_, CartLine>(
            r#"
            INSERT INTO cart_lines (id, user_id, item_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (user_id, item_id) DO UPDATE SET
                quantity = excluded.quantity,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(item_id)
        .bind(quantity)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::ledger::StockCredit;
    use crate::pool::{Database, DbConfig};
    use stockwise_core::{NewItem, ValidationError};

    async fn stocked(db: &Database, input: NewItem, stock: Quantity) -> Item {
        let item = db.items().create(&input).await.unwrap();
        db.ledger()
            .credit(StockCredit::new(&item.id, stock, "seed"))
            .await
            .unwrap();
        item
    }

    fn sugar() -> NewItem {
        NewItem::loose(
            "Brown sugar",
            "g",
            Quantity::from_units(50),
            Quantity::from_units(10),
            Money::from_cents(2),
        )
    }

    #[tokio::test]
    async fn test_add_rejects_off_lattice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = stocked(&db, sugar(), Quantity::from_units(500)).await;

        assert!(matches!(
            db.carts().add_or_increment("u1", &item.id, Quantity::from_units(65)).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::OffIncrement { .. })))
        ));

        let line = db.carts().add_or_increment("u1", &item.id, Quantity::from_units(70)).await.unwrap();
        assert_eq!(line.quantity, Quantity::from_units(70));
    }

    #[tokio::test]
    async fn test_increment_revalidates_total() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = stocked(&db, sugar(), Quantity::from_units(120)).await;

        db.carts().add_or_increment("u1", &item.id, Quantity::from_units(60)).await.unwrap();

        // 60 + 60 ≤ 120
        let line = db.carts().add_or_increment("u1", &item.id, Quantity::from_units(60)).await.unwrap();
        assert_eq!(line.quantity, Quantity::from_units(120));

        // 120 + 50 > 120
        assert!(matches!(
            db.carts().add_or_increment("u1", &item.id, Quantity::from_units(50)).await,
            Err(LedgerError::Domain(CoreError::InsufficientStock { .. }))
        ));

        let lines = db.carts().lines("u1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line.quantity, Quantity::from_units(120));
        assert_eq!(lines[0].line_total(), Money::from_cents(240));
    }

    #[tokio::test]
    async fn test_set_quantity_zero_deletes_and_remove_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pen = stocked(
            &db,
            NewItem::discrete("Blue pen", Money::from_cents(150)),
            Quantity::from_units(10),
        )
        .await;

        let line = db.carts().set_quantity("u1", &pen.id, Quantity::from_units(3)).await.unwrap();
        assert_eq!(line.unwrap().quantity, Quantity::from_units(3));

        let line = db.carts().set_quantity("u1", &pen.id, Quantity::from_units(2)).await.unwrap();
        assert_eq!(line.unwrap().quantity, Quantity::from_units(2));

        assert!(db.carts().set_quantity("u1", &pen.id, Quantity::zero()).await.unwrap().is_none());
        assert!(db.carts().lines("u1").await.unwrap().is_empty());

        assert!(!db.carts().remove("u1", &pen.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_fractional_on_discrete_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pen = stocked(
            &db,
            NewItem::discrete("Blue pen", Money::from_cents(150)),
            Quantity::from_units(10),
        )
        .await;

        assert!(matches!(
            db.carts().set_quantity("u1", &pen.id, Quantity::from_hundredths(150)).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::NotWholeNumber { .. })))
        ));
    }

    #[tokio::test]
    async fn test_disabled_item_cannot_be_added() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pen = stocked(
            &db,
            NewItem::discrete("Blue pen", Money::from_cents(150)),
            Quantity::from_units(10),
        )
        .await;
        db.items().disable(&pen.id).await.unwrap();

        assert!(matches!(
            db.carts().add_or_increment("u1", &pen.id, Quantity::from_units(1)).await,
            Err(LedgerError::Domain(CoreError::ItemDisabled { .. }))
        ));
        assert!(matches!(
            db.carts().add_or_increment("u1", "missing", Quantity::from_units(1)).await,
            Err(LedgerError::Domain(CoreError::NotFound { .. }))
        ));
    }

    /// Adding to cart reserves nothing: two users can each hold more than
    /// half the stock. Only checkout enforces the limit.
    #[tokio::test]
    async fn test_cart_does_not_reserve_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let widget = stocked(
            &db,
            NewItem::discrete("Widget", Money::from_cents(100)),
            Quantity::from_units(100),
        )
        .await;

        db.carts().add_or_increment("alice", &widget.id, Quantity::from_units(60)).await.unwrap();
        db.carts().add_or_increment("bob", &widget.id, Quantity::from_units(60)).await.unwrap();

        db.checkout().checkout("alice").await.unwrap();
        let err = db.checkout().checkout("bob").await.unwrap_err();
        assert!(matches!(err, LedgerError::Domain(CoreError::InsufficientStock { .. })));

        let stock = db.items().get(&widget.id).await.unwrap().unwrap().stock_quantity;
        assert_eq!(stock, Quantity::from_units(40));

        let bob = db.carts().lines("bob").await.unwrap();
        assert_eq!(bob.len(), 1);
        assert!(!bob[0].is_available());
    }

    #[tokio::test]
    async fn test_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pen = stocked(
            &db,
            NewItem::discrete("Blue pen", Money::from_cents(150)),
            Quantity::from_units(10),
        )
        .await;
        let ink = stocked(
            &db,
            NewItem::discrete("Ink", Money::from_cents(400)),
            Quantity::from_units(10),
        )
        .await;

        db.carts().add_or_increment("u1", &pen.id, Quantity::from_units(1)).await.unwrap();
        db.carts().add_or_increment("u1", &ink.id, Quantity::from_units(1)).await.unwrap();
        db.carts().add_or_increment("u2", &ink.id, Quantity::from_units(1)).await.unwrap();

        assert_eq!(db.carts().clear("u1").await.unwrap(), 2);
        assert_eq!(db.carts().lines("u2").await.unwrap().len(), 1);
    }
}
