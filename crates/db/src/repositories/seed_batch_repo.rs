//! Repository for the `seed_batches` table.

use sqlx::PgPool;
use sportsync_core::types::DbId;

use crate::models::seed_batch::{NewSeedBatch, SeedBatch};
use crate::models::status::BatchStatus;

/// Column list for `seed_batches` queries.
const COLUMNS: &str = "id, kind, parent_id, job_run_id, status_id, dry_run, \
    items_total, items_success, items_failed, error, meta, \
    started_at, finished_at, created_at, updated_at";

/// Provides lifecycle operations for seed batches. Only the batch runner
/// mutates these rows; the polling path reads them.
pub struct SeedBatchRepo;

impl SeedBatchRepo {
    /// Create a batch in `queued` status.
    pub async fn create(pool: &PgPool, input: &NewSeedBatch) -> Result<SeedBatch, sqlx::Error> {
        let query = format!(
            "INSERT INTO seed_batches \
                 (kind, parent_id, job_run_id, status_id, dry_run, items_total) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeedBatch>(&query)
            .bind(&input.kind)
            .bind(input.parent_id)
            .bind(input.job_run_id)
            .bind(BatchStatus::Queued.id())
            .bind(input.dry_run)
            .bind(input.items_total)
            .fetch_one(pool)
            .await
    }

    /// Move a batch to `running` and stamp `started_at` once.
    pub async fn mark_running(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE seed_batches SET \
                status_id = $2, \
                started_at = COALESCE(started_at, NOW()), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(BatchStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the expected item total (composites learn theirs late).
    pub async fn set_total(pool: &PgPool, id: DbId, items_total: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE seed_batches SET items_total = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(items_total)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update the running success/failure counters.
    pub async fn update_counts(
        pool: &PgPool,
        id: DbId,
        items_success: i32,
        items_failed: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE seed_batches SET \
                items_success = $2, items_failed = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(items_success)
        .bind(items_failed)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Finalize a batch. The `finished_at IS NULL` guard ensures a batch
    /// is finalized exactly once.
    pub async fn finalize(
        pool: &PgPool,
        id: DbId,
        status: BatchStatus,
        error: Option<&str>,
        meta: Option<&serde_json::Value>,
    ) -> Result<Option<SeedBatch>, sqlx::Error> {
        let query = format!(
            "UPDATE seed_batches SET \
                status_id = $2, error = $3, meta = COALESCE($4, meta), \
                finished_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND finished_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeedBatch>(&query)
            .bind(id)
            .bind(status.id())
            .bind(error)
            .bind(meta)
            .fetch_optional(pool)
            .await
    }

    /// Find a batch by its id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SeedBatch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seed_batches WHERE id = $1");
        sqlx::query_as::<_, SeedBatch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the child step batches of a composite, oldest first.
    pub async fn list_children(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<SeedBatch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM seed_batches WHERE parent_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, SeedBatch>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// List the batches recorded by one job run, oldest first.
    pub async fn list_by_run(
        pool: &PgPool,
        job_run_id: DbId,
    ) -> Result<Vec<SeedBatch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM seed_batches WHERE job_run_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, SeedBatch>(&query)
            .bind(job_run_id)
            .fetch_all(pool)
            .await
    }
}
