//! # Item Repository
//!
//! Catalogue operations for items.
//!
//! ## Key Operations
//! - Create with explicit or generated SKU (generated SKUs retry on collision)
//! - Lookup by id / SKU / barcode
//! - Update descriptive, pricing and policy fields
//! - Soft delete (`disabled = 1`)
//! - Low-stock listing
//!
//! `stock_quantity` is deliberately absent from every write here; it starts
//! at zero and only the Stock Ledger moves it.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use stockwise_core::validation::{validate_item_update, validate_new_item};
use stockwise_core::{CoreError, Item, ItemUpdate, Money, NewItem, NewItemSpec, Quantity, ValidationError};

use crate::error::{DbError, DbResult, LedgerError, LedgerResult};
use crate::sequence::{SequenceGenerator, SKU_COLUMN};

const BARCODE_COLUMN: &str = "items.barcode";

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.items();
///
/// let sugar = repo
///     .create(&NewItem::loose("Brown sugar", "g", min, step, cost).with_category("Baking"))
///     .await?;
///
/// let same = repo.get_by_sku(&sugar.sku).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
    sequence: SequenceGenerator,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool, sequence: SequenceGenerator) -> Self {
        ItemRepository { pool, sequence }
    }

    /// Creates an item with zero stock.
    ///
    /// ## Returns
    /// * `Ok(Item)` - Created item
    /// * `Err(Domain(Validation(Duplicate)))` - Explicit SKU or barcode taken
    /// * `Err(Persistence(SequenceExhausted))` - Generated SKUs kept colliding
    pub async fn create(&self, input: &NewItem) -> LedgerResult<Item> {
        validate_new_item(input)?;

        let item = self
            .sequence
            .retry_on_collision("sku", &[SKU_COLUMN], move |_attempt| async move {
                let sku = match &input.sku {
                    Some(sku) => sku.trim().to_string(),
                    None => self.sequence.generate_sku(input.category.as_deref()),
                };
                let item = item_from_input(input, sku);

                let mut conn = self.pool.acquire().await?;
                insert(&mut *conn, &item)
                    .await
                    .map_err(|e| explicit_duplicate(e, &item, input.sku.is_some()))?;
                Ok(item)
            })
            .await?;

        info!(item_id = %item.id, sku = %item.sku, is_loose = item.is_loose, "Item created");
        Ok(item)
    }

    /// Gets an item by its ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Item>> {
        fetch(&self.pool, id).await
    }

    /// Gets an item by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE sku = ?1")
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Gets an item by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE barcode = ?1")
            .bind(barcode.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Lists items that are not disabled, by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE disabled = 0 ORDER BY name LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Active items at or below their reorder level, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT * FROM items
            WHERE disabled = 0 AND stock_quantity <= reorder_level
            ORDER BY stock_quantity, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Updates descriptive, pricing and policy fields. Never touches stock.
    ///
    /// Switching an item with fractional stock to discrete fails with
    /// `NotWholeNumber`.
    pub async fn update(&self, id: &str, update: &ItemUpdate) -> LedgerResult<Item> {
        validate_item_update(update)?;
        debug!(item_id = %id, "Updating item");

        let result = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                name = ?2,
                barcode = ?3,
                category = ?4,
                unit = ?5,
                is_loose = ?6,
                min_order_quantity = ?7,
                increment_step = ?8,
                reorder_level = ?9,
                cost_price = ?10,
                selling_price = ?11,
                updated_at = ?12
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(update.barcode.as_deref().map(str::trim))
        .bind(update.category.as_deref())
        .bind(update.unit.trim())
        .bind(update.is_loose)
        .bind(update.min_order_quantity)
        .bind(update.increment_step)
        .bind(update.reorder_level)
        .bind(update.cost_price)
        .bind(update.selling_price)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from);

        match result {
            Ok(Some(item)) => Ok(item),
            Ok(None) => Err(LedgerError::not_found("Item", id)),
            Err(err) if err.is_unique_violation_on(BARCODE_COLUMN) => Err(ValidationError::Duplicate {
                field: "barcode".to_string(),
                value: update.barcode.clone().unwrap_or_default(),
            }
            .into()),
            Err(DbError::CheckViolation { .. }) if !update.is_loose => {
                let current = self.get(id).await?.map(|i| i.stock_quantity).unwrap_or_default();
                Err(ValidationError::NotWholeNumber {
                    field: "stock_quantity".to_string(),
                    value: current,
                }
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Soft-deletes an item. History keeps referencing it.
    pub async fn disable(&self, id: &str) -> LedgerResult<()> {
        debug!(item_id = %id, "Disabling item");

        let result = sqlx::query("UPDATE items SET disabled = 1, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("Item", id));
        }
        Ok(())
    }

    /// Counts active items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE disabled = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Loads one item through any executor (pool or open transaction).
pub(crate) async fn fetch<'e, E>(executor: E, id: &str) -> DbResult<Option<Item>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(item)
}

/// Loads one item or fails with `NotFound`.
pub(crate) async fn fetch_required<'e, E>(executor: E, id: &str) -> LedgerResult<Item>
where
    E: Executor<'e, Database = Sqlite>,
{
    fetch(executor, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Item", id).into())
}

/// Inserts an item row. Stock is written as given (always zero from callers).
pub(crate) async fn insert(conn: &mut SqliteConnection, item: &Item) -> DbResult<()> {
    debug!(sku = %item.sku, "Inserting item");

    sqlx::query(
        r#"
        INSERT INTO items (
            id, sku, barcode, name, category, unit,
            is_loose, min_order_quantity, increment_step,
            stock_quantity, reorder_level, cost_price, selling_price,
            disabled, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9,
            ?10, ?11, ?12, ?13,
            ?14, ?15, ?16
        )
        "#,
    )
    .bind(&item.id)
    .bind(&item.sku)
    .bind(&item.barcode)
    .bind(&item.name)
    .bind(&item.category)
    .bind(&item.unit)
    .bind(item.is_loose)
    .bind(item.min_order_quantity)
    .bind(item.increment_step)
    .bind(item.stock_quantity)
    .bind(item.reorder_level)
    .bind(item.cost_price)
    .bind(item.selling_price)
    .bind(item.disabled)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Builds the catalogue row for an item first seen on a goods receipt.
///
/// Loose items accept any hundredth; discrete items any whole count.
pub(crate) fn item_from_receipt(
    spec: &NewItemSpec,
    sku: String,
    cost_price: Money,
    selling_price: Option<Money>,
) -> Item {
    let granularity = if spec.is_loose {
        Quantity::from_hundredths(1)
    } else {
        Quantity::from_units(1)
    };
    let now = Utc::now();

    Item {
        id: generate_item_id(),
        sku,
        barcode: spec.barcode.as_deref().map(|b| b.trim().to_string()),
        name: spec.name.trim().to_string(),
        category: Some(spec.category.trim().to_string()),
        unit: spec.unit.trim().to_string(),
        is_loose: spec.is_loose,
        min_order_quantity: granularity,
        increment_step: granularity,
        stock_quantity: Quantity::zero(),
        reorder_level: Quantity::zero(),
        cost_price,
        selling_price: selling_price.unwrap_or(cost_price),
        disabled: false,
        created_at: now,
        updated_at: now,
    }
}

/// Maps a unique violation on a caller-chosen SKU or barcode to a
/// `Duplicate` validation error. Violations on generated SKUs pass through
/// so the retry loop sees them.
pub(crate) fn explicit_duplicate(err: DbError, item: &Item, explicit_sku: bool) -> LedgerError {
    if explicit_sku && err.is_unique_violation_on(SKU_COLUMN) {
        return ValidationError::Duplicate {
            field: "sku".to_string(),
            value: item.sku.clone(),
        }
        .into();
    }
    if err.is_unique_violation_on(BARCODE_COLUMN) {
        return ValidationError::Duplicate {
            field: "barcode".to_string(),
            value: item.barcode.clone().unwrap_or_default(),
        }
        .into();
    }
    err.into()
}

fn item_from_input(input: &NewItem, sku: String) -> Item {
    let now = Utc::now();
    Item {
        id: generate_item_id(),
        sku,
        barcode: input.barcode.as_deref().map(|b| b.trim().to_string()),
        name: input.name.trim().to_string(),
        category: input.category.as_deref().map(|c| c.trim().to_string()),
        unit: input.unit.trim().to_string(),
        is_loose: input.is_loose,
        min_order_quantity: input.min_order_quantity,
        increment_step: input.increment_step,
        stock_quantity: Quantity::zero(),
        reorder_level: input.reorder_level,
        cost_price: input.cost_price,
        selling_price: input.selling_price.unwrap_or(input.cost_price),
        disabled: false,
        created_at: now,
        updated_at: now,
    }
}

/// Helper to generate a new item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sugar() -> NewItem {
        NewItem::loose(
            "Brown sugar",
            "g",
            Quantity::from_units(50),
            Quantity::from_units(10),
            Money::from_cents(2),
        )
        .with_category("Baking")
    }

    #[tokio::test]
    async fn test_create_generates_sku_and_defaults_selling_price() {
        let db = db().await;
        let item = db.items().create(&sugar()).await.unwrap();

        assert!(item.sku.starts_with("BAK-"));
        assert_eq!(item.stock_quantity, Quantity::zero());
        assert_eq!(item.selling_price, item.cost_price);
        assert!(item.is_loose);

        let loaded = db.items().get_by_sku(&item.sku).await.unwrap().unwrap();
        assert_eq!(loaded.id, item.id);
        assert_eq!(loaded.min_order_quantity, Quantity::from_units(50));
    }

    #[tokio::test]
    async fn test_explicit_duplicate_sku_is_validation_error() {
        let db = db().await;
        let pen = NewItem::discrete("Blue pen", Money::from_cents(150)).with_sku("PEN-BLUE");
        db.items().create(&pen).await.unwrap();

        let err = db.items().create(&pen).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::Validation(ValidationError::Duplicate { ref field, .. })) if field == "sku"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_barcode() {
        let db = db().await;
        let a = NewItem::discrete("Pen A", Money::from_cents(150)).with_barcode("4006381333931");
        let b = NewItem::discrete("Pen B", Money::from_cents(150)).with_barcode("4006381333931");
        db.items().create(&a).await.unwrap();

        let err = db.items().create(&b).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::Validation(ValidationError::Duplicate { ref field, .. })) if field == "barcode"
        ));
        assert!(db.items().get_by_barcode("4006381333931").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_policy_rejected() {
        let db = db().await;
        let mut bad = sugar();
        bad.increment_step = Quantity::zero();
        assert!(matches!(
            db.items().create(&bad).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::MustBePositive { .. })))
        ));
    }

    #[tokio::test]
    async fn test_update_never_touches_stock() {
        let db = db().await;
        let item = db.items().create(&sugar()).await.unwrap();
        db.ledger()
            .credit(crate::ledger::StockCredit::new(&item.id, Quantity::from_units(500), "seed"))
            .await
            .unwrap();

        let mut update = ItemUpdate::from(&item);
        update.selling_price = Money::from_cents(3);
        update.name = "Demerara sugar".to_string();

        let updated = db.items().update(&item.id, &update).await.unwrap();
        assert_eq!(updated.name, "Demerara sugar");
        assert_eq!(updated.selling_price, Money::from_cents(3));
        assert_eq!(updated.stock_quantity, Quantity::from_units(500));
    }

    #[tokio::test]
    async fn test_update_to_discrete_with_fractional_stock() {
        let db = db().await;
        let mut input = sugar();
        input.min_order_quantity = Quantity::from_hundredths(50);
        input.increment_step = Quantity::from_hundredths(50);
        let item = db.items().create(&input).await.unwrap();
        db.ledger()
            .credit(crate::ledger::StockCredit::new(&item.id, Quantity::from_hundredths(250), "seed"))
            .await
            .unwrap();

        let mut update = ItemUpdate::from(&item);
        update.is_loose = false;
        update.min_order_quantity = Quantity::from_units(1);
        update.increment_step = Quantity::from_units(1);

        assert!(matches!(
            db.items().update(&item.id, &update).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::NotWholeNumber { .. })))
        ));
    }

    #[tokio::test]
    async fn test_disable_and_low_stock() {
        let db = db().await;
        let mut pen = NewItem::discrete("Blue pen", Money::from_cents(150));
        pen.reorder_level = Quantity::from_units(5);
        let pen = db.items().create(&pen).await.unwrap();
        let sugar = db.items().create(&sugar()).await.unwrap();

        let low: Vec<String> = db.items().low_stock().await.unwrap().into_iter().map(|i| i.id).collect();
        assert!(low.contains(&pen.id));
        assert!(low.contains(&sugar.id));

        db.items().disable(&pen.id).await.unwrap();
        assert_eq!(db.items().count().await.unwrap(), 1);
        assert!(db.items().get(&pen.id).await.unwrap().unwrap().disabled);
        assert_eq!(db.items().list_active(10).await.unwrap().len(), 1);

        assert!(matches!(
            db.items().disable("missing").await,
            Err(LedgerError::Domain(CoreError::NotFound { .. }))
        ));
    }
}
