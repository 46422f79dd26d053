//! # Database Migrations
//!
//! SQL migrations from `migrations/sqlite/`, embedded at compile time.
//!
//! ```text
//! Database::new
//!      │
//!      ▼
//! _sqlx_migrations ──► compare with embedded set ──► apply pending in order
//!                                                     (one transaction each)
//! ```
//!
//! Never edit an applied migration; add `NNN_description.sql` instead.
//! The schema carries the last line of defence for stock: `CHECK`
//! constraints on `items.stock_quantity` and append-only triggers on
//! `inventory_logs`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts, for health checks.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    // table is absent before the first run
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
