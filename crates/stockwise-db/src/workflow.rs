//! # GRN Workflow
//!
//! Goods receipt notes: creation and the one-way move out of `pending`.
//!
//! ## Create
//! ```text
//! validate header + lines
//! total = Σ(unit_price × received_quantity)        (fixed from here on)
//!      │
//!      ▼  ┌──────────────── retried as a whole on a GRN-number or ────────┐
//!         │                 generated-SKU unique violation (bounded)      │
//!         │  number = GRN-{YYMMDD}-{max(today)+1:03}                      │
//!         │  BEGIN                                                        │
//!         │    INSERT grns (status pending)                               │
//!         │    per line: resolve item (insert zero-stock item if new)     │
//!         │              INSERT grn_items                                 │
//!         │  COMMIT                                                       │
//!         └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transition
//! ```text
//! BEGIN
//!   UPDATE grns SET status = :target WHERE id = :id AND status = 'pending'
//!     0 rows → NotFound | AlreadyFinalized      (loser of a race lands here)
//!   approve: ledger credit per line (cost/selling refresh, one log each)
//! COMMIT
//! publish events (best effort)
//! ```
//!
//! The claim is the first statement of the transaction, so the status check
//! and the write cannot be separated by another approver.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use stockwise_core::validation::{validate_grn_header, validate_grn_lines};
use stockwise_core::{
    receipt_total, CoreError, DomainEvent, Grn, GrnDecision, GrnLine, GrnLineInput, GrnLineItem,
    GrnStatus, Money, NewGrn, ValidationError, REASON_GOODS_RECEIPT,
};

use crate::error::{LedgerError, LedgerResult};
use crate::events::EventSink;
use crate::ledger::{self, StockCredit};
use crate::repository::{grn, item};
use crate::sequence::{SequenceGenerator, GRN_NUMBER_COLUMN, SKU_COLUMN};

/// Creates goods receipts and finalizes them exactly once.
#[derive(Clone)]
pub struct GrnWorkflow {
    pool: sqlx::SqlitePool,
    sequence: SequenceGenerator,
    events: Arc<dyn EventSink>,
}

impl GrnWorkflow {
    pub fn new(pool: sqlx::SqlitePool, sequence: SequenceGenerator, events: Arc<dyn EventSink>) -> Self {
        GrnWorkflow { pool, sequence, events }
    }

    /// Records a delivery as a pending receipt.
    ///
    /// Lines naming a new item create that item (zero stock) in the same
    /// transaction; stock arrives only on approval.
    ///
    /// ## Returns
    /// * `Ok(Grn)` - Pending receipt with its number and total
    /// * `Err(Domain(Validation(..)))` - Empty receipt, incomplete line, unknown
    ///   item, explicit SKU/barcode already taken
    /// * `Err(Persistence(SequenceExhausted))` - Numbering kept colliding
    pub async fn create(&self, header: &NewGrn, lines: &[GrnLineInput]) -> LedgerResult<Grn> {
        validate_grn_header(header)?;
        validate_grn_lines(lines)?;

        let total = receipt_total(lines)?;

        let grn = self
            .sequence
            .retry_on_collision(
                "grn_number",
                &[GRN_NUMBER_COLUMN, SKU_COLUMN],
                move |attempt| async move { self.create_once(header, lines, total, attempt).await },
            )
            .await?;

        info!(
            grn_id = %grn.id,
            grn_number = %grn.grn_number,
            supplier_id = %grn.supplier_id,
            lines = lines.len(),
            total = %grn.total_amount,
            "Goods receipt created"
        );
        Ok(grn)
    }

    async fn create_once(
        &self,
        header: &NewGrn,
        lines: &[GrnLineInput],
        total: Money,
        attempt: u32,
    ) -> LedgerResult<Grn> {
        let now = Utc::now();
        // read outside the transaction; the unique index settles races
        let grn_number = self
            .sequence
            .grn_number(&self.pool, now.date_naive(), attempt)
            .await?;

        let grn = Grn {
            id: Uuid::new_v4().to_string(),
            grn_number,
            supplier_id: header.supplier_id.trim().to_string(),
            po_reference: header.po_reference.clone(),
            received_date: header.received_date,
            received_by: header.received_by.clone(),
            notes: header.notes.clone(),
            total_amount: total,
            status: GrnStatus::Pending,
            finalized_by: None,
            finalized_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;
        grn::insert(&mut tx, &grn).await?;

        for (index, input) in lines.iter().enumerate() {
            let item_id = match &input.item {
                GrnLineItem::Existing { item_id } => {
                    let existing = item::fetch(&mut *tx, item_id).await?.ok_or_else(|| {
                        ValidationError::InvalidLine {
                            line: index + 1,
                            reason: format!("item {item_id} not found"),
                        }
                    })?;
                    if !existing.is_loose && !input.received_quantity.is_whole() {
                        return Err(ValidationError::InvalidLine {
                            line: index + 1,
                            reason: format!(
                                "{} is counted in whole {}, got {}",
                                existing.sku, existing.unit, input.received_quantity
                            ),
                        }
                        .into());
                    }
                    existing.id
                }
                GrnLineItem::New(spec) => {
                    let sku = match &spec.sku {
                        Some(sku) => sku.trim().to_string(),
                        None => self.sequence.generate_sku(Some(&spec.category)),
                    };
                    let created = item::item_from_receipt(spec, sku, input.unit_price, input.selling_price);
                    item::insert(&mut tx, &created)
                        .await
                        .map_err(|e| item::explicit_duplicate(e, &created, spec.sku.is_some()))?;
                    debug!(item_id = %created.id, sku = %created.sku, "Item created from receipt");
                    created.id
                }
            };

            let line_total = input.line_total().ok_or_else(|| ValidationError::InvalidLine {
                line: index + 1,
                reason: "line total is too large".to_string(),
            })?;
            let line = GrnLine {
                id: Uuid::new_v4().to_string(),
                grn_id: grn.id.clone(),
                item_id,
                received_quantity: input.received_quantity,
                unit_price: input.unit_price,
                selling_price: input.selling_price,
                line_total,
                created_at: now,
            };
            grn::insert_line(&mut tx, &line).await?;
        }

        tx.commit().await?;
        Ok(grn)
    }

    /// Approves or rejects a pending receipt.
    ///
    /// ## Returns
    /// * `Ok(Grn)` - The receipt in its terminal status
    /// * `Err(Domain(AlreadyFinalized))` - Someone else got there first
    /// * `Err(Domain(NotFound))`
    /// * any ledger error from a line credit, with nothing applied
    pub async fn transition(&self, grn_id: &str, decision: GrnDecision, actor_id: &str) -> LedgerResult<Grn> {
        let target = decision.target_status();
        debug!(grn_id = %grn_id, target = %target, actor_id = %actor_id, "Finalizing goods receipt");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query_as::<_, Grn>(
            r#"
            UPDATE grns
            SET status = ?1, finalized_by = ?2, finalized_at = ?3, updated_at = ?3
            WHERE id = ?4 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(target)
        .bind(actor_id)
        .bind(now)
        .bind(grn_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(grn) = claimed else {
            let current = grn::fetch(&mut *tx, grn_id)
                .await?
                .ok_or_else(|| LedgerError::not_found("GRN", grn_id))?;
            warn!(grn_number = %current.grn_number, status = %current.status, "Goods receipt already finalized");
            return Err(CoreError::AlreadyFinalized {
                grn_number: current.grn_number,
                status: current.status,
            }
            .into());
        };

        if decision == GrnDecision::Approve {
            let lines = grn::fetch_lines(&mut *tx, &grn.id).await?;
            for line in &lines {
                let credit = StockCredit::new(&line.item_id, line.received_quantity, actor_id)
                    .cost_price(line.unit_price)
                    .selling_price(line.selling_price)
                    .reason(REASON_GOODS_RECEIPT)
                    .reference(&grn.id);
                ledger::credit_in(&mut tx, &credit).await?;
            }
            debug!(grn_number = %grn.grn_number, lines = lines.len(), "Receipt lines credited");
        }

        tx.commit().await?;

        info!(
            grn_id = %grn.id,
            grn_number = %grn.grn_number,
            status = %grn.status,
            actor_id = %actor_id,
            "Goods receipt finalized"
        );

        if decision == GrnDecision::Approve {
            self.events.publish(DomainEvent::InventoryUpdated { grn_id: grn.id.clone() });
        }
        self.events.publish(DomainEvent::GrnCompleted { grn_id: grn.id.clone() });

        Ok(grn)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::events::{BroadcastEventSink, NoopEventSink};
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use stockwise_core::{Item, ItemUpdate, NewItem, NewItemSpec, Quantity};

    fn header() -> NewGrn {
        NewGrn {
            supplier_id: "supplier-1".to_string(),
            po_reference: Some("PO-77".to_string()),
            received_date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            received_by: "clerk-1".to_string(),
            notes: None,
        }
    }

    async fn two_items(db: &Database) -> (Item, Item) {
        let a = db
            .items()
            .create(
                &NewItem::loose(
                    "Flour",
                    "kg",
                    Quantity::from_units(1),
                    Quantity::from_units(1),
                    Money::from_cents(4500),
                )
                .with_sku("FLO-A"),
            )
            .await
            .unwrap();
        let b = db
            .items()
            .create(&NewItem::discrete("Mixer", Money::from_cents(19000)).with_sku("MIX-B"))
            .await
            .unwrap();
        (a, b)
    }

    fn receipt(a: &Item, b: &Item) -> Vec<GrnLineInput> {
        vec![
            GrnLineInput::existing(&a.id, Quantity::from_units(100), Money::from_cents(5000)),
            GrnLineInput::existing(&b.id, Quantity::from_units(5), Money::from_cents(20000)),
        ]
    }

    #[tokio::test]
    async fn test_create_computes_total_and_stays_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, b) = two_items(&db).await;
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));

        let grn = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();

        assert_eq!(grn.total_amount, Money::from_cents(600_000));
        assert_eq!(grn.total_amount.to_string(), "6000.00");
        assert_eq!(grn.status, GrnStatus::Pending);
        assert!(grn.grn_number.starts_with("GRN-"));
        assert_eq!(db.grns().lines(&grn.id).await.unwrap().len(), 2);

        // nothing credited yet
        assert_eq!(db.items().get(&a.id).await.unwrap().unwrap().stock_quantity, Quantity::zero());
    }

    #[tokio::test]
    async fn test_numbers_increase_within_a_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, b) = two_items(&db).await;
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));

        let first = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();
        let second = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();

        assert!(first.grn_number.ends_with("-001"));
        assert!(second.grn_number.ends_with("-002"));
        assert_eq!(first.grn_number[..11], second.grn_number[..11]);
        assert!(db.grns().get_by_number(&second.grn_number).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_approve_credits_each_line_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, b) = two_items(&db).await;
        let sink = BroadcastEventSink::new(8);
        let mut events = sink.subscribe();
        let workflow = db.grn_workflow(Arc::new(sink));

        let grn = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();
        let approved = workflow.transition(&grn.id, GrnDecision::Approve, "manager-1").await.unwrap();

        assert_eq!(approved.status, GrnStatus::Approved);
        assert_eq!(approved.finalized_by.as_deref(), Some("manager-1"));
        assert!(approved.finalized_at.is_some());

        let a_now = db.items().get(&a.id).await.unwrap().unwrap();
        let b_now = db.items().get(&b.id).await.unwrap().unwrap();
        assert_eq!(a_now.stock_quantity, Quantity::from_units(100));
        assert_eq!(b_now.stock_quantity, Quantity::from_units(5));
        assert_eq!(a_now.cost_price, Money::from_cents(5000));
        assert_eq!(b_now.cost_price, Money::from_cents(20000));

        let logs = db.inventory_logs().for_reference(&grn.id).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.reason == REASON_GOODS_RECEIPT && l.actor_id == "manager-1"));

        assert_eq!(events.recv().await.unwrap(), DomainEvent::InventoryUpdated { grn_id: grn.id.clone() });
        assert_eq!(events.recv().await.unwrap(), DomainEvent::GrnCompleted { grn_id: grn.id.clone() });
    }

    #[tokio::test]
    async fn test_reject_leaves_stock_and_cannot_be_reapproved() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, b) = two_items(&db).await;
        let sink = BroadcastEventSink::new(8);
        let mut events = sink.subscribe();
        let workflow = db.grn_workflow(Arc::new(sink));

        let grn = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();
        let rejected = workflow.transition(&grn.id, GrnDecision::Reject, "manager-1").await.unwrap();
        assert_eq!(rejected.status, GrnStatus::Rejected);

        assert_eq!(db.items().get(&a.id).await.unwrap().unwrap().stock_quantity, Quantity::zero());
        assert_eq!(db.items().get(&b.id).await.unwrap().unwrap().stock_quantity, Quantity::zero());
        assert!(db.inventory_logs().for_reference(&grn.id).await.unwrap().is_empty());

        let err = workflow.transition(&grn.id, GrnDecision::Approve, "manager-2").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::AlreadyFinalized { status: GrnStatus::Rejected, .. })
        ));
        assert!(err.to_string().contains("already rejected by someone else"));

        assert_eq!(events.recv().await.unwrap(), DomainEvent::GrnCompleted { grn_id: grn.id.clone() });
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_approve_is_all_or_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, b) = two_items(&db).await;
        let sink = BroadcastEventSink::new(8);
        let mut events = sink.subscribe();
        let workflow = db.grn_workflow(Arc::new(sink));
        let grn = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();

        // the second line's log write fails after the first line is credited
        sqlx::query(&format!(
            r#"
            CREATE TRIGGER inventory_logs_reject_mixer
            BEFORE INSERT ON inventory_logs
            WHEN NEW.item_id = '{}'
            BEGIN
                SELECT RAISE(ABORT, 'log write refused');
            END
            "#,
            b.id
        ))
        .execute(db.pool())
        .await
        .unwrap();

        let err = workflow.transition(&grn.id, GrnDecision::Approve, "manager-1").await.unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
        assert_eq!(err.code(), ErrorCode::PersistenceFailure);

        let stored = db.grns().get(&grn.id).await.unwrap().unwrap();
        assert_eq!(stored.status, GrnStatus::Pending);
        assert!(stored.finalized_by.is_none());

        let a_now = db.items().get(&a.id).await.unwrap().unwrap();
        assert_eq!(a_now.stock_quantity, Quantity::zero());
        assert_eq!(a_now.cost_price, a.cost_price);
        assert_eq!(db.items().get(&b.id).await.unwrap().unwrap().stock_quantity, Quantity::zero());
        assert!(db.inventory_logs().for_reference(&grn.id).await.unwrap().is_empty());
        assert!(events.try_recv().is_err());

        // once the fault is gone the same receipt still approves
        sqlx::query("DROP TRIGGER inventory_logs_reject_mixer")
            .execute(db.pool())
            .await
            .unwrap();
        let approved = workflow.transition(&grn.id, GrnDecision::Approve, "manager-1").await.unwrap();
        assert_eq!(approved.status, GrnStatus::Approved);
        assert_eq!(db.items().get(&a.id).await.unwrap().unwrap().stock_quantity, Quantity::from_units(100));
    }

    #[tokio::test]
    async fn test_transition_missing_grn() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));
        assert!(matches!(
            workflow.transition("missing", GrnDecision::Approve, "m").await,
            Err(LedgerError::Domain(CoreError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_total_is_fixed_at_creation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, b) = two_items(&db).await;
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));
        let grn = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();

        let mut update = ItemUpdate::from(&a);
        update.cost_price = Money::from_cents(1);
        update.selling_price = Money::from_cents(1);
        db.items().update(&a.id, &update).await.unwrap();

        let stored = db.grns().get(&grn.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, Money::from_cents(600_000));
        let line_sum: Money = db.grns().lines(&grn.id).await.unwrap().iter().map(|l| l.line_total).sum();
        assert_eq!(line_sum, stored.total_amount);
    }

    #[tokio::test]
    async fn test_new_item_line_created_at_create_time() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));

        let spec = NewItemSpec {
            name: "Green tea".to_string(),
            category: "Beverages".to_string(),
            sku: None,
            barcode: None,
            unit: "kg".to_string(),
            is_loose: true,
        };
        let mut line = GrnLineInput::new_item(spec, Quantity::from_hundredths(250), Money::from_cents(1200));
        line.selling_price = Some(Money::from_cents(1800));

        let grn = workflow.create(&header(), &[line]).await.unwrap();
        assert_eq!(grn.total_amount, Money::from_cents(3000));

        let lines = db.grns().lines(&grn.id).await.unwrap();
        let item = db.items().get(&lines[0].item_id).await.unwrap().unwrap();
        assert!(item.sku.starts_with("BEV-"));
        assert_eq!(item.stock_quantity, Quantity::zero());
        assert_eq!(item.selling_price, Money::from_cents(1800));

        workflow.transition(&grn.id, GrnDecision::Approve, "manager-1").await.unwrap();
        let item = db.items().get(&item.id).await.unwrap().unwrap();
        assert_eq!(item.stock_quantity, Quantity::from_hundredths(250));
    }

    #[tokio::test]
    async fn test_duplicate_explicit_sku_creates_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (a, _) = two_items(&db).await;
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));

        let spec = NewItemSpec {
            name: "Rye flour".to_string(),
            category: "Baking".to_string(),
            sku: Some(a.sku.clone()),
            barcode: None,
            unit: "kg".to_string(),
            is_loose: true,
        };
        let lines = [
            GrnLineInput::existing(&a.id, Quantity::from_units(1), Money::from_cents(100)),
            GrnLineInput::new_item(spec, Quantity::from_units(1), Money::from_cents(100)),
        ];

        let err = workflow.create(&header(), &lines).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
        assert!(db.grns().list(None, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_receipts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_, b) = two_items(&db).await;
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));

        assert!(matches!(
            workflow.create(&header(), &[]).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::EmptyReceipt)))
        ));

        let unknown = [GrnLineInput::existing("missing", Quantity::from_units(1), Money::from_cents(100))];
        assert!(matches!(
            workflow.create(&header(), &unknown).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::InvalidLine { line: 1, .. })))
        ));

        let fractional = [GrnLineInput::existing(&b.id, Quantity::from_hundredths(150), Money::from_cents(100))];
        assert!(matches!(
            workflow.create(&header(), &fractional).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::InvalidLine { .. })))
        ));

        let free = [GrnLineInput::existing(&b.id, Quantity::from_units(1), Money::zero())];
        assert!(workflow.create(&header(), &free).await.is_err());

        let overflowing = [
            GrnLineInput::existing(&b.id, Quantity::from_units(1), Money::from_cents(100)),
            GrnLineInput::existing(&b.id, Quantity::from_units(1_000_000), Money::from_cents(100_000_000_000_000)),
        ];
        assert!(matches!(
            workflow.create(&header(), &overflowing).await,
            Err(LedgerError::Domain(CoreError::Validation(ValidationError::InvalidLine { line: 2, ref reason })))
                if reason == "line total is too large"
        ));

        assert!(db.grns().list(Some(GrnStatus::Pending), 10).await.unwrap().is_empty());
    }

    /// Two approvers race on one receipt over separate connections.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transitions_finalize_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("grn.db")).max_connections(4))
            .await
            .unwrap();
        let (a, b) = two_items(&db).await;
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));
        let grn = workflow.create(&header(), &receipt(&a, &b)).await.unwrap();

        let approve = tokio::spawn({
            let workflow = workflow.clone();
            let id = grn.id.clone();
            async move { workflow.transition(&id, GrnDecision::Approve, "manager-1").await }
        });
        let reject = tokio::spawn({
            let workflow = workflow.clone();
            let id = grn.id.clone();
            async move { workflow.transition(&id, GrnDecision::Reject, "manager-2").await }
        });

        let results = [approve.await.unwrap(), reject.await.unwrap()];
        let finalized: Vec<&Grn> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let lost = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::Domain(CoreError::AlreadyFinalized { .. }))))
            .count();

        assert_eq!(finalized.len(), 1);
        assert_eq!(lost, 1);

        let expected = if finalized[0].status == GrnStatus::Approved {
            Quantity::from_units(100)
        } else {
            Quantity::zero()
        };
        assert_eq!(db.items().get(&a.id).await.unwrap().unwrap().stock_quantity, expected);
    }

    /// Concurrent creates on one day still produce distinct numbers.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("grn.db")).max_connections(4))
            .await
            .unwrap();
        let (a, b) = two_items(&db).await;
        let workflow = db.grn_workflow(Arc::new(NoopEventSink));
        let lines = receipt(&a, &b);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let workflow = workflow.clone();
                let lines = lines.clone();
                tokio::spawn(async move { workflow.create(&header(), &lines).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().grn_number);
        }
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 3);
    }
}
