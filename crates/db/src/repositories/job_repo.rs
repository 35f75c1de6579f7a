//! Repository for the `jobs` table.

use sqlx::PgPool;
use sportsync_core::types::DbId;

use crate::models::job::{Job, UpdateJob};

/// Column list for `jobs` queries.
const COLUMNS: &str = "id, key, description, enabled, interval_minutes, created_at, updated_at";

/// Provides read and admin-edit operations for job definitions.
/// Definitions are seeded by migration and never created at runtime.
pub struct JobRepo;

impl JobRepo {
    /// List all job definitions, stable order by key.
    pub async fn list(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs ORDER BY key");
        sqlx::query_as::<_, Job>(&query).fetch_all(pool).await
    }

    /// List enabled jobs that have a schedule. Used by the scheduler.
    pub async fn list_schedulable(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE enabled AND interval_minutes IS NOT NULL \
             ORDER BY key"
        );
        sqlx::query_as::<_, Job>(&query).fetch_all(pool).await
    }

    /// Find a job definition by its key.
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE key = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Apply an admin edit to a job definition.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateJob,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET \
                description = COALESCE($2, description), \
                enabled = COALESCE($3, enabled), \
                interval_minutes = COALESCE($4, interval_minutes), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(input.enabled)
            .bind(input.interval_minutes)
            .fetch_optional(pool)
            .await
    }
}
