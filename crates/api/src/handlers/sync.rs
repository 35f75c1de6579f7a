//! Handlers for the `/sync` resource: starting composite seeding jobs and
//! polling their status.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use sportsync_core::types::DbId;
use sportsync_engine::seed::{start_seed_season, SeedSeasonOptions};
use sportsync_engine::status;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn default_true() -> bool {
    true
}

/// Request body for `POST /sync/seed-season`. Accepts a single season or
/// a list of season external ids.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSeasonRequest {
    pub season_external_id: Option<String>,
    pub season_external_ids: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub include_teams: bool,
    #[serde(default = "default_true")]
    pub include_fixtures: bool,
    #[serde(default)]
    pub future_only: bool,
    #[serde(default)]
    pub dry_run: bool,
}

/// Response body: `jobId` for the single form, `jobIds` for the batch
/// variant (one independent job per season).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSeasonResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_ids: Option<Vec<DbId>>,
}

/// POST /sync/seed-season
///
/// Start seeding one or more seasons (plus optionally their teams and
/// fixtures) in the background. Returns 201 with the job id(s) to poll.
pub async fn seed_season(
    State(state): State<AppState>,
    Json(input): Json<SeedSeasonRequest>,
) -> AppResult<impl IntoResponse> {
    let mut seasons: Vec<String> = Vec::new();
    if let Some(id) = &input.season_external_id {
        seasons.push(id.clone());
    }
    if let Some(ids) = &input.season_external_ids {
        seasons.extend(ids.iter().cloned());
    }
    seasons.retain(|id| !id.trim().is_empty());

    if seasons.is_empty() {
        return Err(AppError::BadRequest(
            "seasonExternalId or seasonExternalIds is required".into(),
        ));
    }

    let single = input.season_external_id.is_some() && input.season_external_ids.is_none();

    let mut job_ids = Vec::with_capacity(seasons.len());
    for season_external_id in seasons {
        let opts = SeedSeasonOptions {
            season_external_id,
            include_teams: input.include_teams,
            include_fixtures: input.include_fixtures,
            future_only: input.future_only,
            dry_run: input.dry_run,
        };
        let job_id = start_seed_season(&state.pool, state.provider.clone(), opts).await?;
        job_ids.push(job_id);
    }

    tracing::info!(count = job_ids.len(), dry_run = input.dry_run, "Seeding jobs accepted");

    let body = if single {
        SeedSeasonResponse {
            job_id: Some(job_ids[0]),
            job_ids: None,
        }
    } else {
        SeedSeasonResponse {
            job_id: None,
            job_ids: Some(job_ids),
        }
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: body })))
}

/// GET /sync/jobs/{jobId}/status
///
/// Poll a seeding job. Unknown ids are 404 with a distinct code, never an
/// empty default status.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = status::get_status(&state.pool, job_id).await?;
    Ok(Json(DataResponse { data: view }))
}
