//! Handlers for the `/jobs` resource: definitions, admin edits, manual
//! triggering, and run/item history projections.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sportsync_core::batch::Trigger;
use sportsync_core::types::DbId;
use sportsync_db::models::job::{Job, UpdateJob};
use sportsync_db::repositories::{BatchItemRepo, JobRepo, JobRunRepo};
use sportsync_engine::jobs::run_job;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Pagination query parameters for history listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Fetch a job definition by key or 404.
async fn find_job(pool: &sqlx::PgPool, key: &str) -> AppResult<Job> {
    JobRepo::find_by_key(pool, key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job '{key}' not found")))
}

/// GET /jobs
///
/// List all job definitions.
pub async fn list_jobs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let jobs = JobRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// PATCH /jobs/{key}
///
/// Apply an admin edit (description, enabled flag, schedule).
pub async fn update_job(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<UpdateJob>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state.pool, &key).await?;

    let updated = JobRepo::update(&state.pool, job.id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job '{key}' not found")))?;

    tracing::info!(job_key = %key, enabled = updated.enabled, "Job updated");

    Ok(Json(DataResponse { data: updated }))
}

/// POST /jobs/{key}/run
///
/// Trigger a job manually and wait for it to finish. The run's outcome
/// (including captured work errors) is in the returned row.
pub async fn trigger_job(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state.pool, &key).await?;

    let run = run_job(&state.pool, state.provider.as_ref(), &job, Trigger::Manual).await?;

    tracing::info!(job_key = %key, run_id = run.id, "Manual run finished");

    Ok((StatusCode::CREATED, Json(DataResponse { data: run })))
}

/// GET /jobs/{key}/runs
///
/// A job's run history, newest first, paginated.
pub async fn list_runs(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state.pool, &key).await?;
    let runs = JobRunRepo::list_by_job(&state.pool, job.id, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: runs }))
}

/// GET /jobs/runs/{runId}/items
///
/// The per-entity outcomes recorded by one run's batches, paginated.
pub async fn list_run_items(
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
    Query(page): Query<PageQuery>,
) -> AppResult<impl IntoResponse> {
    JobRunRepo::find_by_id(&state.pool, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("run {run_id} not found")))?;

    let items = BatchItemRepo::list_by_run(&state.pool, run_id, page.limit, page.offset).await?;
    Ok(Json(DataResponse { data: items }))
}
