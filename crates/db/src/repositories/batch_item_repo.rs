//! Repository for the `batch_items` table.

use sqlx::PgPool;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sportsync_core::types::DbId;

use crate::models::seed_batch::{BatchItem, NewBatchItem};

/// Column list for `batch_items` queries.
const COLUMNS: &str = "id, batch_id, action, external_id, error, created_at";

/// Provides append and read operations for the per-item audit trail.
/// Rows are immutable once written.
pub struct BatchItemRepo;

impl BatchItemRepo {
    /// Record one processed item.
    pub async fn insert(pool: &PgPool, input: &NewBatchItem) -> Result<BatchItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO batch_items (batch_id, action, external_id, error) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BatchItem>(&query)
            .bind(input.batch_id)
            .bind(input.action.as_str())
            .bind(&input.external_id)
            .bind(&input.error)
            .fetch_one(pool)
            .await
    }

    /// List one batch's items in processing order, paginated.
    pub async fn list_by_batch(
        pool: &PgPool,
        batch_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<BatchItem>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM batch_items \
             WHERE batch_id = $1 \
             ORDER BY id \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, BatchItem>(&query)
            .bind(batch_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List the items recorded by all batches of one job run, paginated.
    pub async fn list_by_run(
        pool: &PgPool,
        job_run_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<BatchItem>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = "SELECT i.id, i.batch_id, i.action, i.external_id, i.error, i.created_at \
             FROM batch_items i \
             JOIN seed_batches b ON b.id = i.batch_id \
             WHERE b.job_run_id = $1 \
             ORDER BY i.id \
             LIMIT $2 OFFSET $3";
        sqlx::query_as::<_, BatchItem>(query)
            .bind(job_run_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of item rows recorded for a batch.
    pub async fn count_by_batch(pool: &PgPool, batch_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM batch_items WHERE batch_id = $1")
            .bind(batch_id)
            .fetch_one(pool)
            .await
    }
}
