//! Recurring job execution.
//!
//! Each job key maps to one synchronization routine run through the batch
//! runner. The run's outcome (status, counters, error, linking meta) is
//! persisted on the `job_runs` row; work errors are captured there rather
//! than thrown past this boundary.

use chrono::Utc;
use serde_json::json;
use sportsync_core::batch::Trigger;
use sportsync_core::types::DbId;
use sportsync_db::models::job::{Job, JobRun};
use sportsync_db::models::status::RunStatus;
use sportsync_db::repositories::{FixtureRepo, JobRunRepo};
use sportsync_db::DbPool;
use sportsync_provider::SportsProvider;

use crate::error::EngineError;
use crate::runner::{run_batch, BatchContext, BatchOutcome};
use crate::store::PgBatchStore;
use crate::targets::{BookmakerTarget, CountryTarget, LeagueTarget, OddsTarget};

pub const JOB_SYNC_COUNTRIES: &str = "sync-countries";
pub const JOB_SYNC_LEAGUES: &str = "sync-leagues";
pub const JOB_SYNC_BOOKMAKERS: &str = "sync-bookmakers";
pub const JOB_REFRESH_ODDS: &str = "refresh-odds";

/// How many upcoming fixtures one odds refresh covers.
const ODDS_FIXTURE_WINDOW: i64 = 20;

/// Execute one job and record its run.
///
/// Work failures (provider down, every item rejected) finalize the run as
/// failed with the captured error; only infrastructure failures while
/// recording the run itself surface as `Err`.
pub async fn run_job(
    pool: &DbPool,
    provider: &dyn SportsProvider,
    job: &Job,
    trigger: Trigger,
) -> Result<JobRun, EngineError> {
    let run = JobRunRepo::start(pool, job.id, trigger).await?;

    if !job.enabled {
        tracing::info!(job_key = %job.key, run_id = run.id, "Job is disabled, skipping");
        let finished = JobRunRepo::finish(
            pool,
            run.id,
            RunStatus::Skipped,
            None,
            Some("job is disabled"),
            None,
        )
        .await?;
        return Ok(finished.unwrap_or(run));
    }

    tracing::info!(job_key = %job.key, run_id = run.id, trigger = %trigger, "Job started");

    let finished = match execute(pool, provider, &job.key, run.id).await {
        Ok(outcome) => {
            let status = if outcome.succeeded() {
                RunStatus::Success
            } else {
                RunStatus::Failed
            };
            let error = (!outcome.succeeded()).then(|| "all items failed".to_string());
            let meta = json!({
                "batch_id": outcome.batch_id,
                "ok": outcome.ok,
                "fail": outcome.fail,
                "total": outcome.total,
            });
            JobRunRepo::finish(
                pool,
                run.id,
                status,
                Some(outcome.ok as i64),
                error.as_deref(),
                Some(&meta),
            )
            .await?
        }
        Err(EngineError::UnknownJobKey(key)) => {
            tracing::warn!(job_key = %key, run_id = run.id, "No routine for job key");
            JobRunRepo::finish(
                pool,
                run.id,
                RunStatus::Skipped,
                None,
                Some(&format!("unknown job key: {key}")),
                None,
            )
            .await?
        }
        Err(e) => {
            tracing::error!(job_key = %job.key, run_id = run.id, error = %e, "Job failed");
            JobRunRepo::finish(pool, run.id, RunStatus::Failed, None, Some(&e.to_string()), None)
                .await?
        }
    };

    Ok(finished.unwrap_or(run))
}

/// Fetch the snapshot for a job key and run it as one batch. Fetch errors
/// here happen before any item is processed and fail the whole run.
async fn execute(
    pool: &DbPool,
    provider: &dyn SportsProvider,
    key: &str,
    run_id: DbId,
) -> Result<BatchOutcome, EngineError> {
    let store = PgBatchStore::new(pool.clone());
    let ctx = BatchContext {
        dry_run: false,
        parent_id: None,
        job_run_id: Some(run_id),
    };

    match key {
        JOB_SYNC_COUNTRIES => {
            let items = provider.countries().await?;
            run_batch(&store, &CountryTarget::new(pool.clone()), &items, &ctx).await
        }
        JOB_SYNC_LEAGUES => {
            let items = provider.leagues().await?;
            run_batch(&store, &LeagueTarget::new(pool.clone()), &items, &ctx).await
        }
        JOB_SYNC_BOOKMAKERS => {
            let items = provider.bookmakers().await?;
            run_batch(&store, &BookmakerTarget::new(pool.clone()), &items, &ctx).await
        }
        JOB_REFRESH_ODDS => {
            let fixtures =
                FixtureRepo::list_upcoming(pool, Utc::now(), ODDS_FIXTURE_WINDOW).await?;
            let mut quotes = Vec::new();
            for fixture in &fixtures {
                quotes.extend(provider.odds_by_fixture(&fixture.external_id).await?);
            }
            run_batch(&store, &OddsTarget::new(pool.clone()), &quotes, &ctx).await
        }
        other => Err(EngineError::UnknownJobKey(other.to_string())),
    }
}
