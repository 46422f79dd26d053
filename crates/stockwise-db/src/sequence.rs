//! # Sequence Generator
//!
//! Generates SKUs and GRN numbers that stay unique under concurrent callers,
//! without in-process locks.
//!
//! ## Retry Contract
//! ```text
//! attempt 1:  read max(today) ──► GRN-261018-007 ──► INSERT ──► ✓
//!                                                      │
//!                                       UNIQUE failed  ▼ (another writer won)
//! attempt 2:  read max(today) ──► GRN-261018-008 ──► INSERT ──► ✓
//!                                                      │
//!                                                      ▼
//! attempt 3:  GRN-261018-009-4821 (random disambiguator) ──► INSERT
//!                                                      │
//!                                                      ▼
//!                                   DbError::SequenceExhausted (reported)
//! ```
//!
//! The whole transaction is retried, not just the number, so a collision
//! never leaves a half-written receipt behind.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use sqlx::{Executor, Sqlite};
use std::future::Future;
use tracing::{debug, warn};

use stockwise_core::sequence::{
    format_fallback_grn_number, format_grn_number, format_sku, grn_date_prefix, next_grn_sequence,
    random_bound, sku_prefix, DEFAULT_SKU_PREFIX,
};

use crate::config::SequenceSettings;
use crate::error::{DbError, DbResult, LedgerError, LedgerResult};

/// Unique column guarding GRN numbers.
pub const GRN_NUMBER_COLUMN: &str = "grns.grn_number";

/// Unique column guarding SKUs.
pub const SKU_COLUMN: &str = "items.sku";

const FALLBACK_RANDOM_BOUND: u32 = 10_000;

/// Identifier generator shared by item creation and the GRN workflow.
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator {
    settings: SequenceSettings,
}

impl SequenceGenerator {
    pub fn new(settings: SequenceSettings) -> Self {
        SequenceGenerator { settings }
    }

    /// Bound on attempts, never below one.
    pub fn max_attempts(&self) -> u32 {
        self.settings.max_attempts.max(1)
    }

    /// Generates a SKU: category prefix, last eight digits of the current
    /// millisecond timestamp, random suffix.
    ///
    /// Collisions are possible by construction; callers retry on
    /// `items.sku` unique violations.
    pub fn generate_sku(&self, category: Option<&str>) -> String {
        let prefix = category.map_or_else(|| DEFAULT_SKU_PREFIX.to_string(), sku_prefix);
        let digits = self.settings.sku_random_digits;
        let random = rand::thread_rng().gen_range(0..random_bound(digits));
        format_sku(&prefix, Utc::now().timestamp_millis(), random, digits)
    }

    /// Produces the GRN number for `attempt` (1-based) on `date`.
    ///
    /// Reads the highest sequence already used for the day. On the last of
    /// several attempts a random suffix is appended.
    pub async fn grn_number<'e, E>(&self, executor: E, date: NaiveDate, attempt: u32) -> DbResult<String>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let prefix = grn_date_prefix(date);
        let pattern = format!("{prefix}%");

        let existing: Vec<String> =
            sqlx::query_scalar("SELECT grn_number FROM grns WHERE grn_number LIKE ?1")
                .bind(&pattern)
                .fetch_all(executor)
                .await?;

        let seq = next_grn_sequence(&prefix, existing.iter().map(String::as_str));
        let max = self.max_attempts();

        let number = if attempt >= max && max > 1 {
            let random = rand::thread_rng().gen_range(0..FALLBACK_RANDOM_BOUND);
            format_fallback_grn_number(date, seq, random)
        } else {
            format_grn_number(date, seq)
        };

        debug!(grn_number = %number, attempt, "Allocated GRN number");
        Ok(number)
    }

    /// Runs `op` until it succeeds, fails with something other than a unique
    /// violation on one of `columns`, or runs out of attempts.
    ///
    /// `op` receives the 1-based attempt number and must perform its whole
    /// unit of work (transaction included) each time.
    pub async fn retry_on_collision<T, F, Fut>(
        &self,
        sequence: &str,
        columns: &[&str],
        mut op: F,
    ) -> LedgerResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let max = self.max_attempts();

        for attempt in 1..=max {
            match op(attempt).await {
                Err(LedgerError::Persistence(err))
                    if columns.iter().any(|c| err.is_unique_violation_on(c)) =>
                {
                    warn!(sequence, attempt, max_attempts = max, error = %err, "Identifier collision, retrying");
                }
                other => return other,
            }
        }

        Err(DbError::SequenceExhausted {
            sequence: sequence.to_string(),
            attempts: max,
        }
        .into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn generator(max_attempts: u32) -> SequenceGenerator {
        SequenceGenerator::new(SequenceSettings {
            max_attempts,
            sku_random_digits: 4,
        })
    }

    #[test]
    fn test_generate_sku_shape() {
        let sku = generator(3).generate_sku(Some("Grains"));
        let parts: Vec<&str> = sku.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "GRA");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 4);
        assert!(stockwise_core::validation::validate_sku(&sku).is_ok());

        assert!(generator(3).generate_sku(None).starts_with("GEN-"));
    }

    #[tokio::test]
    async fn test_grn_number_first_of_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let number = generator(3).grn_number(db.pool(), date, 1).await.unwrap();
        assert_eq!(number, "GRN-261018-001");
    }

    #[tokio::test]
    async fn test_grn_number_fallback_on_last_attempt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let number = generator(3).grn_number(db.pool(), date, 3).await.unwrap();
        assert!(number.starts_with("GRN-261018-001-"));
        assert_eq!(number.len(), "GRN-261018-001-0000".len());

        // a single permitted attempt stays sequential
        let single = generator(1).grn_number(db.pool(), date, 1).await.unwrap();
        assert_eq!(single, "GRN-261018-001");
    }

    #[tokio::test]
    async fn test_retry_stops_after_bound() {
        let calls = AtomicU32::new(0);
        let result: LedgerResult<()> = generator(3)
            .retry_on_collision("grn_number", &[GRN_NUMBER_COLUMN], |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DbError::duplicate(GRN_NUMBER_COLUMN, "GRN-261018-001").into()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(LedgerError::Persistence(DbError::SequenceExhausted { attempts: 3, .. }))
        ));
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_collision() {
        let result = generator(3)
            .retry_on_collision("sku", &[SKU_COLUMN], |attempt| async move {
                if attempt == 1 {
                    Err(DbError::duplicate(SKU_COLUMN, "GRA-1").into())
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_retry_does_not_swallow_other_errors() {
        let calls = AtomicU32::new(0);
        let result: LedgerResult<()> = generator(3)
            .retry_on_collision("sku", &[SKU_COLUMN], |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DbError::duplicate("items.barcode", "123").into()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(LedgerError::Persistence(DbError::UniqueViolation { .. }))));
    }
}
