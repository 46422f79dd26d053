//! # Inventory Log Repository
//!
//! Read side of the append-only stock audit trail. Rows are written only by
//! [`crate::ledger`] inside the credit transaction; the schema rejects
//! UPDATE and DELETE with triggers.

use sqlx::{SqliteConnection, SqlitePool};

use stockwise_core::InventoryLogEntry;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct InventoryLogRepository {
    pool: SqlitePool,
}

impl InventoryLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryLogRepository { pool }
    }

    /// History for one item, oldest first.
    pub async fn for_item(&self, item_id: &str) -> DbResult<Vec<InventoryLogEntry>> {
        let entries = sqlx::query_as::<_, InventoryLogEntry>(
            "SELECT * FROM inventory_logs WHERE item_id = ?1 ORDER BY created_at, rowid",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Entries written on behalf of one source document (a GRN id).
    pub async fn for_reference(&self, reference_id: &str) -> DbResult<Vec<InventoryLogEntry>> {
        let entries = sqlx::query_as::<_, InventoryLogEntry>(
            "SELECT * FROM inventory_logs WHERE reference_id = ?1 ORDER BY created_at, rowid",
        )
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

pub(crate) async fn insert(conn: &mut SqliteConnection, entry: &InventoryLogEntry) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_logs (
            id, item_id, delta, previous_quantity, new_quantity,
            reason, reference_id, actor_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.item_id)
    .bind(entry.delta)
    .bind(entry.previous_quantity)
    .bind(entry.new_quantity)
    .bind(&entry.reason)
    .bind(&entry.reference_id)
    .bind(&entry.actor_id)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
