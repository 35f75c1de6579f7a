//! Route definitions for the `/sync-center` inspection views.

use axum::routing::get;
use axum::Router;

use crate::handlers::sync_center;
use crate::state::AppState;

/// Routes mounted at `/sync-center`.
///
/// ```text
/// GET    /db/{entity}        -> db_snapshot
/// GET    /provider/{entity}  -> provider_snapshot
/// GET    /diff/{entity}      -> diff
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/db/{entity}", get(sync_center::db_snapshot))
        .route("/provider/{entity}", get(sync_center::provider_snapshot))
        .route("/diff/{entity}", get(sync_center::diff))
}
