//! Read-only status projection for polling clients.
//!
//! Maps a stored batch row onto the reduced caller-facing vocabulary.
//! Unknown job ids are a distinct error, never an empty default status:
//! "not started" and "does not exist" must stay distinguishable.

use sportsync_core::batch::{progress_percent, JobState, JobStatusView};
use sportsync_core::types::DbId;
use sportsync_db::models::seed_batch::SeedBatch;
use sportsync_db::models::status::BatchStatus;
use sportsync_db::repositories::SeedBatchRepo;
use sportsync_db::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("job {0} not found")]
    NotFound(DbId),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Fetch and project the status of one job (a parent batch).
///
/// Pure read of persisted state; safe under concurrent pollers.
pub async fn get_status(pool: &DbPool, job_id: DbId) -> Result<JobStatusView, StatusError> {
    let batch = SeedBatchRepo::find_by_id(pool, job_id)
        .await?
        .ok_or(StatusError::NotFound(job_id))?;
    Ok(project_status(&batch))
}

/// Map one batch row to the polling view.
///
/// queued -> waiting, running -> active, success -> completed,
/// failed -> failed. `result` is the stored meta passed through verbatim
/// and only once the job completed.
pub fn project_status(batch: &SeedBatch) -> JobStatusView {
    let state = match BatchStatus::from_id(batch.status_id) {
        Some(BatchStatus::Queued) => JobState::Waiting,
        Some(BatchStatus::Running) => JobState::Active,
        Some(BatchStatus::Success) => JobState::Completed,
        Some(BatchStatus::Failed) | None => JobState::Failed,
    };

    let result = if state == JobState::Completed {
        batch.meta.clone()
    } else {
        None
    };

    JobStatusView {
        job_id: batch.id,
        state,
        progress: progress_percent(batch.items_success, batch.items_failed, batch.items_total),
        result,
        error: batch.error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn batch(status: BatchStatus) -> SeedBatch {
        let now = Utc::now();
        SeedBatch {
            id: 11,
            kind: "seed_season".into(),
            parent_id: None,
            job_run_id: None,
            status_id: status.id(),
            dry_run: false,
            items_total: 0,
            items_success: 0,
            items_failed: 0,
            error: None,
            meta: None,
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn maps_statuses_onto_caller_vocabulary() {
        assert_eq!(project_status(&batch(BatchStatus::Queued)).state, JobState::Waiting);
        assert_eq!(project_status(&batch(BatchStatus::Running)).state, JobState::Active);
        assert_eq!(project_status(&batch(BatchStatus::Success)).state, JobState::Completed);
        assert_eq!(project_status(&batch(BatchStatus::Failed)).state, JobState::Failed);
    }

    #[test]
    fn progress_present_only_with_items() {
        let empty = batch(BatchStatus::Running);
        assert_eq!(project_status(&empty).progress, None);

        let mut partial = batch(BatchStatus::Running);
        partial.items_total = 4;
        partial.items_success = 1;
        partial.items_failed = 1;
        assert_eq!(project_status(&partial).progress, Some(50));
    }

    #[test]
    fn result_only_once_completed() {
        let meta = json!({"kind": "seed_season", "version": 1});

        let mut running = batch(BatchStatus::Running);
        running.meta = Some(meta.clone());
        assert_eq!(project_status(&running).result, None);

        let mut done = batch(BatchStatus::Success);
        done.meta = Some(meta.clone());
        // Stored meta comes back verbatim.
        assert_eq!(project_status(&done).result, Some(meta));
    }

    #[test]
    fn failure_carries_the_stored_error() {
        let mut failed = batch(BatchStatus::Failed);
        failed.error = Some("provider returned HTTP 503".into());
        let view = project_status(&failed);
        assert_eq!(view.state, JobState::Failed);
        assert_eq!(view.error.as_deref(), Some("provider returned HTTP 503"));
        assert_eq!(view.result, None);
    }
}
