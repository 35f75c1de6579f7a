//! Scheduler loop for recurring jobs.
//!
//! A single cooperative interval loop checks which enabled jobs are due
//! and runs them one at a time. The loop exits when the provided
//! [`CancellationToken`] is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sportsync_core::batch::Trigger;
use sportsync_core::types::Timestamp;
use sportsync_db::repositories::{JobRepo, JobRunRepo};
use sportsync_db::DbPool;
use sportsync_provider::SportsProvider;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::jobs::run_job;

/// How often the scheduler polls for due jobs.
const SCHEDULER_TICK: Duration = Duration::from_secs(60);

/// Background service that triggers due jobs on a periodic basis.
pub struct Scheduler {
    pool: DbPool,
    provider: Arc<dyn SportsProvider>,
}

impl Scheduler {
    pub fn new(pool: DbPool, provider: Arc<dyn SportsProvider>) -> Self {
        Self { pool, provider }
    }

    /// Run the scheduler loop until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(SCHEDULER_TICK);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.run_due_jobs().await {
                        tracing::error!(error = %e, "Scheduler pass failed");
                    }
                }
            }
        }
    }

    /// Run every schedulable job whose interval has elapsed.
    async fn run_due_jobs(&self) -> Result<(), EngineError> {
        let jobs = JobRepo::list_schedulable(&self.pool).await?;
        let now = Utc::now();

        for job in &jobs {
            let Some(interval_minutes) = job.interval_minutes else {
                continue;
            };
            let last = JobRunRepo::last_started(&self.pool, job.id).await?;
            if !is_due(interval_minutes, last, now) {
                continue;
            }

            if let Err(e) =
                run_job(&self.pool, self.provider.as_ref(), job, Trigger::Scheduled).await
            {
                tracing::error!(job_key = %job.key, error = %e, "Scheduled run failed");
            }
        }

        Ok(())
    }
}

/// A job is due when it never ran or its interval has fully elapsed
/// since the last start.
pub fn is_due(interval_minutes: i32, last_started: Option<Timestamp>, now: Timestamp) -> bool {
    match last_started {
        None => true,
        Some(last) => last + chrono::Duration::minutes(interval_minutes as i64) <= now,
    }
}
