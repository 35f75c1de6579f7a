//! Route definitions for the `/sync` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

/// Routes mounted at `/sync`.
///
/// ```text
/// POST   /seed-season            -> seed_season
/// GET    /jobs/{jobId}/status    -> job_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/seed-season", post(sync::seed_season))
        .route("/jobs/{job_id}/status", get(sync::job_status))
}
