//! # GRN Repository
//!
//! Read access to goods receipt notes and their lines, plus the row writers
//! the workflow composes inside its transactions. Status changes go through
//! [`crate::workflow::GrnWorkflow`] only.

use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use stockwise_core::{Grn, GrnLine, GrnStatus};

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct GrnRepository {
    pool: SqlitePool,
}

impl GrnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        GrnRepository { pool }
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Grn>> {
        fetch(&self.pool, id).await
    }

    pub async fn get_by_number(&self, grn_number: &str) -> DbResult<Option<Grn>> {
        let grn = sqlx::query_as::<_, Grn>("SELECT * FROM grns WHERE grn_number = ?1")
            .bind(grn_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(grn)
    }

    pub async fn lines(&self, grn_id: &str) -> DbResult<Vec<GrnLine>> {
        fetch_lines(&self.pool, grn_id).await
    }

    /// Receipts newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<GrnStatus>, limit: u32) -> DbResult<Vec<Grn>> {
        let grns = match status {
            Some(status) => {
                sqlx::query_as::<_, Grn>(
                    "SELECT * FROM grns WHERE status = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
                )
                .bind(status)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Grn>("SELECT * FROM grns ORDER BY created_at DESC, rowid DESC LIMIT ?1")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(grns)
    }
}

pub(crate) async fn fetch<'e, E>(executor: E, id: &str) -> DbResult<Option<Grn>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let grn = sqlx::query_as::<_, Grn>("SELECT * FROM grns WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(grn)
}

pub(crate) async fn fetch_lines<'e, E>(executor: E, grn_id: &str) -> DbResult<Vec<GrnLine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let lines = sqlx::query_as::<_, GrnLine>("SELECT * FROM grn_items WHERE grn_id = ?1 ORDER BY rowid")
        .bind(grn_id)
        .fetch_all(executor)
        .await?;
    Ok(lines)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, grn: &Grn) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO grns (
            id, grn_number, supplier_id, po_reference, received_date, received_by,
            notes, total_amount, status, finalized_by, finalized_at,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12, ?13
        )
        "#,
    )
    .bind(&grn.id)
    .bind(&grn.grn_number)
    .bind(&grn.supplier_id)
    .bind(&grn.po_reference)
    .bind(grn.received_date)
    .bind(&grn.received_by)
    .bind(&grn.notes)
    .bind(grn.total_amount)
    .bind(grn.status)
    .bind(&grn.finalized_by)
    .bind(grn.finalized_at)
    .bind(grn.created_at)
    .bind(grn.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn insert_line(conn: &mut SqliteConnection, line: &GrnLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO grn_items (
            id, grn_id, item_id, received_quantity, unit_price,
            selling_price, line_total, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&line.id)
    .bind(&line.grn_id)
    .bind(&line.item_id)
    .bind(line.received_quantity)
    .bind(line.unit_price)
    .bind(line.selling_price)
    .bind(line.line_total)
    .bind(line.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
