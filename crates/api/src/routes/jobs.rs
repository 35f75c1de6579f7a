//! Route definitions for the `/jobs` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// GET    /                    -> list_jobs
/// PATCH  /{key}               -> update_job
/// POST   /{key}/run           -> trigger_job
/// GET    /{key}/runs          -> list_runs
/// GET    /runs/{runId}/items  -> list_run_items
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list_jobs))
        .route("/{key}", patch(jobs::update_job))
        .route("/{key}/run", post(jobs::trigger_job))
        .route("/{key}/runs", get(jobs::list_runs))
        .route("/runs/{run_id}/items", get(jobs::list_run_items))
}
