//! Handlers for the `/sync-center` inspection views: raw store and
//! provider snapshots per entity, and the reconciled diff view.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sportsync_core::pagination::MAX_PAGE_LIMIT;
use sportsync_core::reconcile::{reconcile, summarize, Reconcilable, ReconcileOrder};
use sportsync_db::repositories::{
    BookmakerRepo, CountryRepo, FixtureRepo, LeagueRepo, OddsRepo, SeasonRepo, TeamRepo,
};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Entity types exposed through the sync-center views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Countries,
    Leagues,
    Teams,
    Seasons,
    Fixtures,
    Bookmakers,
    Odds,
}

/// Query parameters shared by the sync-center endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    /// Season scope, required for team/fixture/season views.
    pub season: Option<String>,
    /// Fixture scope, required for odds views.
    pub fixture: Option<String>,
    #[serde(default)]
    pub future_only: bool,
    pub order: Option<ReconcileOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn require<'a>(value: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| AppError::BadRequest(format!("{name} query parameter is required")))
}

fn to_data<T: Serialize>(rows: T) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let value = serde_json::to_value(rows)
        .map_err(|e| AppError::InternalError(format!("serialization failed: {e}")))?;
    Ok(Json(DataResponse { data: value }))
}

/// GET /sync-center/db/{entity}
///
/// The store-side snapshot, paginated.
pub async fn db_snapshot(
    State(state): State<AppState>,
    Path(entity): Path<EntityKind>,
    Query(q): Query<SnapshotQuery>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let pool = &state.pool;
    match entity {
        EntityKind::Countries => to_data(CountryRepo::list(pool, q.limit, q.offset).await?),
        EntityKind::Leagues => to_data(LeagueRepo::list(pool, q.limit, q.offset).await?),
        EntityKind::Teams => to_data(TeamRepo::list(pool, q.limit, q.offset).await?),
        EntityKind::Seasons => to_data(SeasonRepo::list(pool, q.limit, q.offset).await?),
        EntityKind::Bookmakers => to_data(BookmakerRepo::list(pool, q.limit, q.offset).await?),
        EntityKind::Fixtures => {
            let season = require(&q.season, "season")?;
            to_data(FixtureRepo::list_by_season(pool, season, q.limit, q.offset).await?)
        }
        EntityKind::Odds => match &q.fixture {
            Some(fixture) => {
                to_data(OddsRepo::list_by_fixture(pool, fixture, q.limit, q.offset).await?)
            }
            None => to_data(OddsRepo::list(pool, q.limit, q.offset).await?),
        },
    }
}

/// GET /sync-center/provider/{entity}
///
/// The provider-side snapshot, fetched live.
pub async fn provider_snapshot(
    State(state): State<AppState>,
    Path(entity): Path<EntityKind>,
    Query(q): Query<SnapshotQuery>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let provider = state.provider.as_ref();
    match entity {
        EntityKind::Countries => to_data(provider.countries().await?),
        EntityKind::Leagues => to_data(provider.leagues().await?),
        EntityKind::Bookmakers => to_data(provider.bookmakers().await?),
        EntityKind::Teams => {
            let season = require(&q.season, "season")?;
            to_data(provider.teams_by_season(season).await?)
        }
        EntityKind::Seasons => {
            let season = require(&q.season, "season")?;
            to_data(provider.season(season).await?)
        }
        EntityKind::Fixtures => {
            let season = require(&q.season, "season")?;
            to_data(provider.fixtures_by_season(season, q.future_only).await?)
        }
        EntityKind::Odds => {
            let fixture = require(&q.fixture, "fixture")?;
            to_data(provider.odds_by_fixture(fixture).await?)
        }
    }
}

/// GET /sync-center/diff/{entity}
///
/// The reconciled view: both snapshots joined on external id, one entry
/// per entity with its diff status, plus summary counts. Recomputed on
/// every request, never persisted.
pub async fn diff(
    State(state): State<AppState>,
    Path(entity): Path<EntityKind>,
    Query(q): Query<SnapshotQuery>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let pool = &state.pool;
    let provider = state.provider.as_ref();
    let order = q.order.unwrap_or_default();
    let full = Some(MAX_PAGE_LIMIT);

    let payload = match entity {
        EntityKind::Countries => diff_payload(
            CountryRepo::list(pool, full, None).await?,
            provider.countries().await?,
            order,
        ),
        EntityKind::Leagues => diff_payload(
            LeagueRepo::list(pool, full, None).await?,
            provider.leagues().await?,
            order,
        ),
        EntityKind::Bookmakers => diff_payload(
            BookmakerRepo::list(pool, full, None).await?,
            provider.bookmakers().await?,
            order,
        ),
        EntityKind::Teams => {
            let season = require(&q.season, "season")?;
            diff_payload(
                TeamRepo::list(pool, full, None).await?,
                provider.teams_by_season(season).await?,
                order,
            )
        }
        EntityKind::Seasons => {
            let season = require(&q.season, "season")?;
            let db_side = SeasonRepo::find_by_external_id(pool, season)
                .await?
                .into_iter()
                .collect();
            diff_payload(db_side, vec![provider.season(season).await?], order)
        }
        EntityKind::Fixtures => {
            let season = require(&q.season, "season")?;
            diff_payload(
                FixtureRepo::list_by_season(pool, season, full, None).await?,
                provider.fixtures_by_season(season, q.future_only).await?,
                order,
            )
        }
        EntityKind::Odds => {
            let fixture = require(&q.fixture, "fixture")?;
            diff_payload(
                OddsRepo::list_by_fixture(pool, fixture, full, None).await?,
                provider.odds_by_fixture(fixture).await?,
                order,
            )
        }
    };

    Ok(Json(DataResponse { data: payload }))
}

fn diff_payload<D, P>(db: Vec<D>, provider: Vec<P>, order: ReconcileOrder) -> serde_json::Value
where
    D: Reconcilable + Serialize,
    P: Reconcilable + Serialize,
{
    let unified = reconcile(db, provider, order, Utc::now());
    let summary = summarize(&unified);
    serde_json::json!({
        "entities": unified,
        "summary": summary,
    })
}
