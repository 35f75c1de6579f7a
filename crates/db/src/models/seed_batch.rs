//! Seed batch and batch item models.

use serde::Serialize;
use sqlx::FromRow;
use sportsync_core::batch::ItemAction;
use sportsync_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `seed_batches` table: one execution of a multi-item
/// seeding operation. Composite jobs own a parent row whose id is the
/// caller-facing job id; each step runs as a child row (`parent_id` set).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeedBatch {
    pub id: DbId,
    pub kind: String,
    pub parent_id: Option<DbId>,
    pub job_run_id: Option<DbId>,
    pub status_id: StatusId,
    pub dry_run: bool,
    pub items_total: i32,
    pub items_success: i32,
    pub items_failed: i32,
    pub error: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a seed batch.
#[derive(Debug, Clone)]
pub struct NewSeedBatch {
    pub kind: String,
    pub parent_id: Option<DbId>,
    pub job_run_id: Option<DbId>,
    pub dry_run: bool,
    pub items_total: i32,
}

/// A row from the `batch_items` table: the recorded outcome of one
/// entity within a batch. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BatchItem {
    pub id: DbId,
    pub batch_id: DbId,
    pub action: String,
    pub external_id: String,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording a batch item.
#[derive(Debug, Clone)]
pub struct NewBatchItem {
    pub batch_id: DbId,
    pub action: ItemAction,
    pub external_id: String,
    pub error: Option<String>,
}
