//! Repository for the `job_runs` table.

use sqlx::PgPool;
use sportsync_core::batch::Trigger;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sportsync_core::types::{DbId, Timestamp};

use crate::models::job::JobRun;
use crate::models::status::RunStatus;

/// Column list for `job_runs` queries.
const COLUMNS: &str = "id, job_id, status_id, triggered_by, started_at, finished_at, \
    duration_ms, rows_affected, error, meta, created_at";

/// Provides run-history operations. A run is created when execution
/// starts and finalized exactly once when execution ends.
pub struct JobRunRepo;

impl JobRunRepo {
    /// Record the start of an execution.
    pub async fn start(
        pool: &PgPool,
        job_id: DbId,
        trigger: Trigger,
    ) -> Result<JobRun, sqlx::Error> {
        let query = format!(
            "INSERT INTO job_runs (job_id, status_id, triggered_by) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobRun>(&query)
            .bind(job_id)
            .bind(RunStatus::Running.id())
            .bind(trigger.as_str())
            .fetch_one(pool)
            .await
    }

    /// Finalize a run. The `finished_at IS NULL` guard makes this
    /// idempotent: a second finalize is a no-op returning `None`.
    pub async fn finish(
        pool: &PgPool,
        id: DbId,
        status: RunStatus,
        rows_affected: Option<i64>,
        error: Option<&str>,
        meta: Option<&serde_json::Value>,
    ) -> Result<Option<JobRun>, sqlx::Error> {
        let query = format!(
            "UPDATE job_runs SET \
                status_id = $2, \
                finished_at = NOW(), \
                duration_ms = (EXTRACT(EPOCH FROM (NOW() - started_at)) * 1000)::BIGINT, \
                rows_affected = $3, \
                error = $4, \
                meta = COALESCE($5, meta) \
             WHERE id = $1 AND finished_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobRun>(&query)
            .bind(id)
            .bind(status.id())
            .bind(rows_affected)
            .bind(error)
            .bind(meta)
            .fetch_optional(pool)
            .await
    }

    /// Find a run by its id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<JobRun>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM job_runs WHERE id = $1");
        sqlx::query_as::<_, JobRun>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a job's runs, newest first, paginated.
    pub async fn list_by_job(
        pool: &PgPool,
        job_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<JobRun>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM job_runs \
             WHERE job_id = $1 \
             ORDER BY started_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, JobRun>(&query)
            .bind(job_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// When the job last started, if ever. Drives scheduler due checks.
    pub async fn last_started(
        pool: &PgPool,
        job_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(started_at) FROM job_runs WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(pool)
            .await
    }
}
