//! Route definitions, grouped by resource.

pub mod health;
pub mod jobs;
pub mod sync;
pub mod sync_center;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sync", sync::router())
        .nest("/sync-center", sync_center::router())
        .nest("/jobs", jobs::router())
}
