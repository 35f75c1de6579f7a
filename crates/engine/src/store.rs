//! The batch bookkeeping seam.
//!
//! [`BatchStore`] is the record-store contract the runner and the composite
//! seeder write through: batch rows with exact counters and an immutable
//! per-item audit trail. [`PgBatchStore`] is the production implementation
//! over the repositories; tests substitute an in-memory store.

use async_trait::async_trait;
use sportsync_core::types::DbId;
use sportsync_db::models::seed_batch::{NewBatchItem, NewSeedBatch};
use sportsync_db::models::status::BatchStatus;
use sportsync_db::repositories::{BatchItemRepo, SeedBatchRepo};
use sportsync_db::DbPool;

use crate::error::EngineError;

/// Persistence operations for batch rows and their item audit trail.
///
/// Only the batch runner and the composite seeder call these; the polling
/// path reads the same rows but never writes.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Create a batch in `queued` status and return its id.
    async fn create(&self, new: NewSeedBatch) -> Result<DbId, EngineError>;

    /// Move a batch to `running`.
    async fn mark_running(&self, batch_id: DbId) -> Result<(), EngineError>;

    /// Replace the expected item total.
    async fn set_total(&self, batch_id: DbId, items_total: i32) -> Result<(), EngineError>;

    /// Append one item outcome to the audit trail.
    async fn record_item(&self, item: NewBatchItem) -> Result<(), EngineError>;

    /// Update the running success/failure counters.
    async fn update_counts(
        &self,
        batch_id: DbId,
        items_success: i32,
        items_failed: i32,
    ) -> Result<(), EngineError>;

    /// Finalize a batch exactly once.
    async fn finalize(
        &self,
        batch_id: DbId,
        status: BatchStatus,
        error: Option<String>,
        meta: Option<serde_json::Value>,
    ) -> Result<(), EngineError>;
}

/// Postgres-backed [`BatchStore`].
#[derive(Clone)]
pub struct PgBatchStore {
    pool: DbPool,
}

impl PgBatchStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BatchStore for PgBatchStore {
    async fn create(&self, new: NewSeedBatch) -> Result<DbId, EngineError> {
        let batch = SeedBatchRepo::create(&self.pool, &new).await?;
        Ok(batch.id)
    }

    async fn mark_running(&self, batch_id: DbId) -> Result<(), EngineError> {
        SeedBatchRepo::mark_running(&self.pool, batch_id).await?;
        Ok(())
    }

    async fn set_total(&self, batch_id: DbId, items_total: i32) -> Result<(), EngineError> {
        SeedBatchRepo::set_total(&self.pool, batch_id, items_total).await?;
        Ok(())
    }

    async fn record_item(&self, item: NewBatchItem) -> Result<(), EngineError> {
        BatchItemRepo::insert(&self.pool, &item).await?;
        Ok(())
    }

    async fn update_counts(
        &self,
        batch_id: DbId,
        items_success: i32,
        items_failed: i32,
    ) -> Result<(), EngineError> {
        SeedBatchRepo::update_counts(&self.pool, batch_id, items_success, items_failed).await?;
        Ok(())
    }

    async fn finalize(
        &self,
        batch_id: DbId,
        status: BatchStatus,
        error: Option<String>,
        meta: Option<serde_json::Value>,
    ) -> Result<(), EngineError> {
        SeedBatchRepo::finalize(&self.pool, batch_id, status, error.as_deref(), meta.as_ref())
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store for tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// One batch row as tracked by the in-memory store.
    #[derive(Debug, Clone)]
    pub struct MemoryBatch {
        pub id: DbId,
        pub kind: String,
        pub parent_id: Option<DbId>,
        pub dry_run: bool,
        pub items_total: i32,
        pub items_success: i32,
        pub items_failed: i32,
        pub status: BatchStatus,
        pub error: Option<String>,
        pub meta: Option<serde_json::Value>,
        pub finalize_calls: u32,
    }

    #[derive(Default)]
    struct Inner {
        next_id: DbId,
        batches: Vec<MemoryBatch>,
        items: Vec<NewBatchItem>,
    }

    /// In-memory [`BatchStore`] mirroring the Postgres semantics,
    /// including the finalize-once guard.
    #[derive(Default)]
    pub struct MemoryBatchStore {
        inner: Mutex<Inner>,
    }

    impl MemoryBatchStore {
        pub fn batches(&self) -> Vec<MemoryBatch> {
            self.inner.lock().unwrap().batches.clone()
        }

        pub fn batch(&self, id: DbId) -> MemoryBatch {
            self.batches()
                .into_iter()
                .find(|b| b.id == id)
                .expect("batch exists")
        }

        pub fn items_for(&self, batch_id: DbId) -> Vec<NewBatchItem> {
            self.inner
                .lock()
                .unwrap()
                .items
                .iter()
                .filter(|i| i.batch_id == batch_id)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl BatchStore for MemoryBatchStore {
        async fn create(&self, new: NewSeedBatch) -> Result<DbId, EngineError> {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.batches.push(MemoryBatch {
                id,
                kind: new.kind,
                parent_id: new.parent_id,
                dry_run: new.dry_run,
                items_total: new.items_total,
                items_success: 0,
                items_failed: 0,
                status: BatchStatus::Queued,
                error: None,
                meta: None,
                finalize_calls: 0,
            });
            Ok(id)
        }

        async fn mark_running(&self, batch_id: DbId) -> Result<(), EngineError> {
            let mut inner = self.inner.lock().unwrap();
            let batch = batch_mut(&mut inner, batch_id)?;
            batch.status = BatchStatus::Running;
            Ok(())
        }

        async fn set_total(&self, batch_id: DbId, items_total: i32) -> Result<(), EngineError> {
            let mut inner = self.inner.lock().unwrap();
            batch_mut(&mut inner, batch_id)?.items_total = items_total;
            Ok(())
        }

        async fn record_item(&self, item: NewBatchItem) -> Result<(), EngineError> {
            self.inner.lock().unwrap().items.push(item);
            Ok(())
        }

        async fn update_counts(
            &self,
            batch_id: DbId,
            items_success: i32,
            items_failed: i32,
        ) -> Result<(), EngineError> {
            let mut inner = self.inner.lock().unwrap();
            let batch = batch_mut(&mut inner, batch_id)?;
            batch.items_success = items_success;
            batch.items_failed = items_failed;
            Ok(())
        }

        async fn finalize(
            &self,
            batch_id: DbId,
            status: BatchStatus,
            error: Option<String>,
            meta: Option<serde_json::Value>,
        ) -> Result<(), EngineError> {
            let mut inner = self.inner.lock().unwrap();
            let batch = batch_mut(&mut inner, batch_id)?;
            batch.finalize_calls += 1;
            if batch.finalize_calls > 1 {
                return Ok(());
            }
            batch.status = status;
            batch.error = error;
            if meta.is_some() {
                batch.meta = meta;
            }
            Ok(())
        }
    }

    fn batch_mut(inner: &mut Inner, batch_id: DbId) -> Result<&mut MemoryBatch, EngineError> {
        inner
            .batches
            .iter_mut()
            .find(|b| b.id == batch_id)
            .ok_or_else(|| EngineError::Internal(format!("no batch {batch_id}")))
    }
}
