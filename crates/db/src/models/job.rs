//! Job definition and run-history models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sportsync_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `jobs` table: a named, configurable unit of recurring
/// or on-demand synchronization work. Seeded at migration time, mutated
/// by admin edits, never deleted in normal operation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub key: String,
    pub description: String,
    pub enabled: bool,
    /// Scheduling interval; `NULL` means on-demand only.
    pub interval_minutes: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for admin edits via `PATCH /jobs/{key}`.
#[derive(Debug, Deserialize)]
pub struct UpdateJob {
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub interval_minutes: Option<i32>,
}

/// A row from the `job_runs` table: one execution of a job.
///
/// Finalized exactly once (`finished_at` set); immutable afterwards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobRun {
    pub id: DbId,
    pub job_id: DbId,
    pub status_id: StatusId,
    pub triggered_by: String,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub duration_ms: Option<i64>,
    pub rows_affected: Option<i64>,
    pub error: Option<String>,
    pub meta: serde_json::Value,
    pub created_at: Timestamp,
}
