//! The batch job runner.
//!
//! [`run_batch`] consumes a list of already-fetched provider DTOs and
//! applies each one to the store independently: one item's failure never
//! aborts the rest. Counters on the batch row are kept in lockstep with
//! the item audit trail, so `items_total == items_success + items_failed
//! == count(item rows)` holds after every run.

use async_trait::async_trait;
use sportsync_core::batch::{BatchResult, ItemAction, StepResult, BATCH_RESULT_VERSION};
use sportsync_core::types::DbId;
use sportsync_db::models::seed_batch::{NewBatchItem, NewSeedBatch};
use sportsync_db::models::status::BatchStatus;

use crate::error::EngineError;
use crate::store::BatchStore;

/// Applies one provider DTO to the record store.
///
/// Implementations upsert by external id. In dry-run mode the outcome is
/// still computed (inserted vs. updated, via a read) but nothing is
/// written. Item-level failures are returned as `Err` and isolated by the
/// runner.
#[async_trait]
pub trait SeedTarget: Send + Sync {
    type Item: Send + Sync;

    /// Batch kind recorded in history (e.g. "season", "teams").
    fn kind(&self) -> &'static str;

    /// The item's provider-assigned external id.
    fn external_id(&self, item: &Self::Item) -> String;

    /// Apply one item, honoring `dry_run`.
    async fn apply(&self, item: &Self::Item, dry_run: bool) -> Result<ItemAction, EngineError>;
}

/// Cross-cutting inputs for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchContext {
    pub dry_run: bool,
    /// Parent batch when this run is one step of a composite.
    pub parent_id: Option<DbId>,
    /// Job run this batch belongs to, for scheduled/manual syncs.
    pub job_run_id: Option<DbId>,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchOutcome {
    pub batch_id: DbId,
    pub ok: u32,
    pub fail: u32,
    pub total: u32,
    pub status: BatchStatus,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == BatchStatus::Success
    }

    /// This outcome as a step entry in a composite batch result.
    pub fn step_result(&self) -> StepResult {
        StepResult {
            ok: self.ok,
            fail: self.fail,
            total: self.total,
            error: None,
        }
    }
}

/// Run one batch over already-fetched items.
///
/// Items are processed one at a time in input order. A failing item is
/// recorded as a `failed` audit row and processing continues. The batch
/// finalizes as `failed` only when every item failed; an empty batch is a
/// valid `success`. Store errors (as opposed to item-apply errors) are
/// infrastructure failures and abort the run.
pub async fn run_batch<S, T>(
    store: &S,
    target: &T,
    items: &[T::Item],
    ctx: &BatchContext,
) -> Result<BatchOutcome, EngineError>
where
    S: BatchStore + ?Sized,
    T: SeedTarget + ?Sized,
{
    let total = items.len() as u32;

    let batch_id = store
        .create(NewSeedBatch {
            kind: target.kind().to_string(),
            parent_id: ctx.parent_id,
            job_run_id: ctx.job_run_id,
            dry_run: ctx.dry_run,
            items_total: total as i32,
        })
        .await?;
    store.mark_running(batch_id).await?;

    let mut ok: u32 = 0;
    let mut fail: u32 = 0;

    for item in items {
        let external_id = target.external_id(item);

        let recorded = match target.apply(item, ctx.dry_run).await {
            Ok(action) => {
                ok += 1;
                NewBatchItem {
                    batch_id,
                    action,
                    external_id,
                    error: None,
                }
            }
            Err(e) => {
                fail += 1;
                tracing::warn!(
                    batch_id,
                    external_id = %external_id,
                    error = %e,
                    "Batch item failed",
                );
                NewBatchItem {
                    batch_id,
                    action: ItemAction::Failed,
                    external_id,
                    error: Some(e.to_string()),
                }
            }
        };

        store.record_item(recorded).await?;
        store.update_counts(batch_id, ok as i32, fail as i32).await?;
    }

    let status = if total > 0 && ok == 0 {
        BatchStatus::Failed
    } else {
        BatchStatus::Success
    };

    let outcome = BatchOutcome {
        batch_id,
        ok,
        fail,
        total,
        status,
    };

    let meta = BatchResult::EntitySync {
        version: BATCH_RESULT_VERSION,
        entity: target.kind().to_string(),
        outcome: outcome.step_result(),
    };
    store
        .finalize(batch_id, status, None, Some(meta.to_value()))
        .await?;

    tracing::info!(
        batch_id,
        kind = target.kind(),
        ok,
        fail,
        total,
        dry_run = ctx.dry_run,
        "Batch finished",
    );

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;
    use crate::store::testing::MemoryBatchStore;

    /// Test target over string items; ids listed in `failing` error out.
    /// Non-dry runs land in `written` so idempotency can be asserted.
    struct MapTarget {
        failing: HashSet<String>,
        written: Mutex<HashMap<String, String>>,
        applied_dry: Mutex<Vec<bool>>,
    }

    impl MapTarget {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing: failing.iter().map(|s| s.to_string()).collect(),
                written: Mutex::new(HashMap::new()),
                applied_dry: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SeedTarget for MapTarget {
        type Item = String;

        fn kind(&self) -> &'static str {
            "widgets"
        }

        fn external_id(&self, item: &String) -> String {
            item.clone()
        }

        async fn apply(&self, item: &String, dry_run: bool) -> Result<ItemAction, EngineError> {
            self.applied_dry.lock().unwrap().push(dry_run);
            if self.failing.contains(item) {
                return Err(EngineError::Internal(format!("write rejected for {item}")));
            }
            if dry_run {
                let exists = self.written.lock().unwrap().contains_key(item);
                return Ok(if exists { ItemAction::Updated } else { ItemAction::Inserted });
            }
            let previous = self
                .written
                .lock()
                .unwrap()
                .insert(item.clone(), item.clone());
            Ok(if previous.is_none() { ItemAction::Inserted } else { ItemAction::Updated })
        }
    }

    fn items(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn partial_failure_is_isolated() {
        let store = MemoryBatchStore::default();
        let target = MapTarget::new(&["b"]);

        let outcome = run_batch(&store, &target, &items(&["a", "b", "c"]), &BatchContext::default())
            .await
            .unwrap();

        assert_eq!(outcome.ok, 2);
        assert_eq!(outcome.fail, 1);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.status, BatchStatus::Success);

        // Item b failed but c was still processed.
        let recorded = store.items_for(outcome.batch_id);
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[1].action, ItemAction::Failed);
        assert!(recorded[1].error.as_deref().unwrap().contains("write rejected"));
        assert_eq!(recorded[2].action, ItemAction::Inserted);
    }

    #[tokio::test]
    async fn counters_reconcile_with_item_rows() {
        let store = MemoryBatchStore::default();
        let target = MapTarget::new(&["x"]);

        let outcome = run_batch(
            &store,
            &target,
            &items(&["x", "y", "z", "w"]),
            &BatchContext::default(),
        )
        .await
        .unwrap();

        let batch = store.batch(outcome.batch_id);
        assert_eq!(batch.items_total, 4);
        assert_eq!(
            batch.items_total,
            batch.items_success + batch.items_failed,
        );
        assert_eq!(
            store.items_for(outcome.batch_id).len() as i32,
            batch.items_total,
        );
    }

    #[tokio::test]
    async fn all_items_failed_marks_batch_failed() {
        let store = MemoryBatchStore::default();
        let target = MapTarget::new(&["a", "b"]);

        let outcome = run_batch(&store, &target, &items(&["a", "b"]), &BatchContext::default())
            .await
            .unwrap();

        assert_eq!(outcome.ok, 0);
        assert_eq!(outcome.fail, 2);
        assert_eq!(outcome.status, BatchStatus::Failed);
    }

    #[tokio::test]
    async fn empty_batch_is_success() {
        let store = MemoryBatchStore::default();
        let target = MapTarget::new(&[]);

        let outcome = run_batch(&store, &target, &[], &BatchContext::default())
            .await
            .unwrap();

        assert_eq!(outcome.total, 0);
        assert_eq!(outcome.status, BatchStatus::Success);
        assert!(store.items_for(outcome.batch_id).is_empty());
    }

    #[tokio::test]
    async fn dry_run_computes_outcomes_without_writing() {
        let store = MemoryBatchStore::default();
        let target = MapTarget::new(&[]);

        let outcome = run_batch(
            &store,
            &target,
            &items(&["a", "b"]),
            &BatchContext {
                dry_run: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.ok, 2);
        assert!(target.written.lock().unwrap().is_empty());
        assert!(store.batch(outcome.batch_id).dry_run);
        // Outcomes were still reported as if the run were real.
        let recorded = store.items_for(outcome.batch_id);
        assert!(recorded.iter().all(|i| i.action == ItemAction::Inserted));
        assert!(target.applied_dry.lock().unwrap().iter().all(|d| *d));
    }

    #[tokio::test]
    async fn reseeding_converges_without_duplicates() {
        let store = MemoryBatchStore::default();
        let target = MapTarget::new(&[]);
        let snapshot = items(&["a", "b", "c"]);

        let first = run_batch(&store, &target, &snapshot, &BatchContext::default())
            .await
            .unwrap();
        let state_after_first = target.written.lock().unwrap().clone();

        let second = run_batch(&store, &target, &snapshot, &BatchContext::default())
            .await
            .unwrap();

        // Same final store state, no duplicated entities.
        assert_eq!(*target.written.lock().unwrap(), state_after_first);
        assert_eq!(target.written.lock().unwrap().len(), 3);

        // The second run updated in place.
        let actions: Vec<ItemAction> = store
            .items_for(second.batch_id)
            .iter()
            .map(|i| i.action)
            .collect();
        assert_eq!(actions, vec![ItemAction::Updated; 3]);

        // Each run left its own audit trail.
        assert_ne!(first.batch_id, second.batch_id);
        assert_eq!(store.batches().len(), 2);
    }

    #[tokio::test]
    async fn finalized_meta_is_kind_tagged() {
        let store = MemoryBatchStore::default();
        let target = MapTarget::new(&[]);

        let outcome = run_batch(&store, &target, &items(&["a"]), &BatchContext::default())
            .await
            .unwrap();

        let meta = store.batch(outcome.batch_id).meta.unwrap();
        assert_eq!(meta["kind"], "entity_sync");
        assert_eq!(meta["entity"], "widgets");
        assert_eq!(meta["outcome"]["ok"], 1);
        assert_eq!(meta["outcome"]["total"], 1);
    }
}
