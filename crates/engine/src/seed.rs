//! Composite season seeding.
//!
//! One call seeds a season row plus, optionally, its teams and fixtures.
//! The caller-facing job id is the parent batch's id; each step runs as a
//! child batch through the regular runner. A provider fetch error fails
//! the affected step before any of its items run; the composite as a
//! whole fails only when the season step fails -- team or fixture trouble
//! is reported in the result but does not undo the season.

use std::sync::Arc;

use sportsync_core::batch::{BatchResult, StepResult, BATCH_RESULT_VERSION};
use sportsync_core::types::DbId;
use sportsync_db::models::seed_batch::NewSeedBatch;
use sportsync_db::models::status::BatchStatus;
use sportsync_db::repositories::SeedBatchRepo;
use sportsync_db::DbPool;
use sportsync_provider::dto::{FixtureDto, SeasonDto, TeamDto};
use sportsync_provider::{ProviderError, SportsProvider};

use crate::error::EngineError;
use crate::runner::{run_batch, BatchContext, SeedTarget};
use crate::store::{BatchStore, PgBatchStore};
use crate::targets::{FixtureTarget, SeasonTarget, TeamTarget};

/// Batch kind recorded for the composite parent.
pub const KIND_SEED_SEASON: &str = "seed_season";

/// Options for one composite seeding job.
#[derive(Debug, Clone)]
pub struct SeedSeasonOptions {
    pub season_external_id: String,
    pub include_teams: bool,
    pub include_fixtures: bool,
    pub future_only: bool,
    pub dry_run: bool,
}

/// Everything the composite writes through or reads from. Wired with
/// Postgres-backed implementations in production; tests substitute
/// in-memory doubles.
pub struct SeedDeps<'a> {
    pub store: &'a dyn BatchStore,
    pub provider: &'a dyn SportsProvider,
    pub seasons: &'a dyn SeedTarget<Item = SeasonDto>,
    pub teams: &'a dyn SeedTarget<Item = TeamDto>,
    pub fixtures: &'a dyn SeedTarget<Item = FixtureDto>,
}

/// Create the parent batch and start the composite in the background.
///
/// Returns the parent batch id immediately; callers poll it via the job
/// status endpoint.
pub async fn start_seed_season(
    pool: &DbPool,
    provider: Arc<dyn SportsProvider>,
    opts: SeedSeasonOptions,
) -> Result<DbId, EngineError> {
    let parent = SeedBatchRepo::create(
        pool,
        &NewSeedBatch {
            kind: KIND_SEED_SEASON.to_string(),
            parent_id: None,
            job_run_id: None,
            dry_run: opts.dry_run,
            items_total: 0,
        },
    )
    .await?;

    tracing::info!(
        batch_id = parent.id,
        season = %opts.season_external_id,
        dry_run = opts.dry_run,
        "Season seeding started",
    );

    let pool = pool.clone();
    let parent_id = parent.id;
    tokio::spawn(async move {
        let store = PgBatchStore::new(pool.clone());
        let seasons = SeasonTarget::new(pool.clone());
        let teams = TeamTarget::new(pool.clone());
        let fixtures = FixtureTarget::new(pool.clone());
        let deps = SeedDeps {
            store: &store,
            provider: provider.as_ref(),
            seasons: &seasons,
            teams: &teams,
            fixtures: &fixtures,
        };

        if let Err(e) = execute_seed_season(&deps, parent_id, &opts).await {
            tracing::error!(batch_id = parent_id, error = %e, "Season seeding aborted");
            let _ = SeedBatchRepo::finalize(
                &pool,
                parent_id,
                BatchStatus::Failed,
                Some(&e.to_string()),
                None,
            )
            .await;
        }
    });

    Ok(parent_id)
}

/// Run the composite against an already-created parent batch.
pub async fn execute_seed_season(
    deps: &SeedDeps<'_>,
    parent_id: DbId,
    opts: &SeedSeasonOptions,
) -> Result<(), EngineError> {
    deps.store.mark_running(parent_id).await?;

    let ctx = BatchContext {
        dry_run: opts.dry_run,
        parent_id: Some(parent_id),
        job_run_id: None,
    };

    let mut teams_step: Option<StepResult> = None;
    let mut fixtures_step: Option<StepResult> = None;

    // Season first: the rest of the composite hangs off it.
    let season_fetch = deps
        .provider
        .season(&opts.season_external_id)
        .await
        .map(|season| vec![season]);
    let season_step = run_step(deps.store, deps.seasons, season_fetch, &ctx).await?;
    let season_ok = season_step.succeeded();
    aggregate(deps.store, parent_id, &season_step, &teams_step, &fixtures_step).await?;

    if season_ok {
        if opts.include_teams {
            let fetch = deps.provider.teams_by_season(&opts.season_external_id).await;
            teams_step = Some(run_step(deps.store, deps.teams, fetch, &ctx).await?);
            aggregate(deps.store, parent_id, &season_step, &teams_step, &fixtures_step).await?;
        }

        if opts.include_fixtures {
            let fetch = deps
                .provider
                .fixtures_by_season(&opts.season_external_id, opts.future_only)
                .await;
            fixtures_step = Some(run_step(deps.store, deps.fixtures, fetch, &ctx).await?);
            aggregate(deps.store, parent_id, &season_step, &teams_step, &fixtures_step).await?;
        }
    }

    let status = if season_ok {
        BatchStatus::Success
    } else {
        BatchStatus::Failed
    };
    let meta = BatchResult::SeedSeason {
        version: BATCH_RESULT_VERSION,
        season: season_step.clone(),
        teams: teams_step,
        fixtures: fixtures_step,
    };

    deps.store
        .finalize(parent_id, status, season_step.error.clone(), Some(meta.to_value()))
        .await?;

    tracing::info!(
        batch_id = parent_id,
        season = %opts.season_external_id,
        ok = season_ok,
        "Season seeding finished",
    );

    Ok(())
}

/// Run one step from a fetch result. A fetch error fails the step before
/// any item runs: a failed child batch is recorded with the raw error and
/// no item rows.
async fn run_step<I: Send + Sync>(
    store: &dyn BatchStore,
    target: &dyn SeedTarget<Item = I>,
    fetched: Result<Vec<I>, ProviderError>,
    ctx: &BatchContext,
) -> Result<StepResult, EngineError> {
    match fetched {
        Ok(items) => {
            let outcome = run_batch(store, target, &items, ctx).await?;
            Ok(outcome.step_result())
        }
        Err(e) => {
            let message = e.to_string();
            tracing::warn!(kind = target.kind(), error = %message, "Step fetch failed");
            let batch_id = store
                .create(NewSeedBatch {
                    kind: target.kind().to_string(),
                    parent_id: ctx.parent_id,
                    job_run_id: ctx.job_run_id,
                    dry_run: ctx.dry_run,
                    items_total: 0,
                })
                .await?;
            store
                .finalize(batch_id, BatchStatus::Failed, Some(message.clone()), None)
                .await?;
            Ok(StepResult {
                error: Some(message),
                ..Default::default()
            })
        }
    }
}

/// Roll the step counters up onto the parent row so pollers see progress
/// as steps complete.
async fn aggregate(
    store: &dyn BatchStore,
    parent_id: DbId,
    season: &StepResult,
    teams: &Option<StepResult>,
    fixtures: &Option<StepResult>,
) -> Result<(), EngineError> {
    let steps = [Some(season), teams.as_ref(), fixtures.as_ref()];
    let (mut ok, mut fail, mut total) = (0u32, 0u32, 0u32);
    for step in steps.into_iter().flatten() {
        ok += step.ok;
        fail += step.fail;
        total += step.total;
    }

    store.set_total(parent_id, total as i32).await?;
    store.update_counts(parent_id, ok as i32, fail as i32).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::marker::PhantomData;

    use async_trait::async_trait;
    use chrono::Utc;
    use sportsync_core::batch::ItemAction;
    use sportsync_provider::dto::{BookmakerDto, CountryDto, LeagueDto, OddsDto};

    use super::*;
    use crate::store::testing::MemoryBatchStore;

    // -- Test doubles --

    trait HasId {
        fn id(&self) -> &str;
    }

    impl HasId for SeasonDto {
        fn id(&self) -> &str {
            &self.id
        }
    }
    impl HasId for TeamDto {
        fn id(&self) -> &str {
            &self.id
        }
    }
    impl HasId for FixtureDto {
        fn id(&self) -> &str {
            &self.id
        }
    }

    struct StubTarget<I> {
        kind: &'static str,
        failing: HashSet<String>,
        _marker: PhantomData<I>,
    }

    impl<I> StubTarget<I> {
        fn new(kind: &'static str, failing: &[&str]) -> Self {
            Self {
                kind,
                failing: failing.iter().map(|s| s.to_string()).collect(),
                _marker: PhantomData,
            }
        }
    }

    #[async_trait]
    impl<I: HasId + Send + Sync> SeedTarget for StubTarget<I> {
        type Item = I;

        fn kind(&self) -> &'static str {
            self.kind
        }

        fn external_id(&self, item: &I) -> String {
            item.id().to_string()
        }

        async fn apply(&self, item: &I, _dry_run: bool) -> Result<ItemAction, EngineError> {
            if self.failing.contains(item.id()) {
                return Err(EngineError::Internal(format!("rejected {}", item.id())));
            }
            Ok(ItemAction::Inserted)
        }
    }

    /// Provider whose `None` fields simulate fetch failures.
    struct ScriptedProvider {
        season: Option<SeasonDto>,
        teams: Option<Vec<TeamDto>>,
        fixtures: Option<Vec<FixtureDto>>,
    }

    fn unavailable() -> ProviderError {
        ProviderError::Status {
            status: 503,
            body: "provider unavailable".into(),
        }
    }

    #[async_trait]
    impl SportsProvider for ScriptedProvider {
        async fn countries(&self) -> Result<Vec<CountryDto>, ProviderError> {
            Err(unavailable())
        }

        async fn leagues(&self) -> Result<Vec<LeagueDto>, ProviderError> {
            Err(unavailable())
        }

        async fn bookmakers(&self) -> Result<Vec<BookmakerDto>, ProviderError> {
            Err(unavailable())
        }

        async fn season(&self, _external_id: &str) -> Result<SeasonDto, ProviderError> {
            self.season.clone().ok_or_else(unavailable)
        }

        async fn teams_by_season(
            &self,
            _season_external_id: &str,
        ) -> Result<Vec<TeamDto>, ProviderError> {
            self.teams.clone().ok_or_else(unavailable)
        }

        async fn fixtures_by_season(
            &self,
            _season_external_id: &str,
            _future_only: bool,
        ) -> Result<Vec<FixtureDto>, ProviderError> {
            self.fixtures.clone().ok_or_else(unavailable)
        }

        async fn odds_by_fixture(
            &self,
            _fixture_external_id: &str,
        ) -> Result<Vec<OddsDto>, ProviderError> {
            Err(unavailable())
        }
    }

    // -- Fixtures --

    fn season_dto() -> SeasonDto {
        SeasonDto {
            id: "s-2026".into(),
            league_id: "l-1".into(),
            year: 2026,
            start_date: None,
            end_date: None,
            current: true,
        }
    }

    fn team(id: &str) -> TeamDto {
        TeamDto {
            id: id.into(),
            name: format!("Team {id}"),
            code: None,
            country_code: None,
        }
    }

    fn fixture(id: &str) -> FixtureDto {
        FixtureDto {
            id: id.into(),
            season_id: "s-2026".into(),
            home_team_id: "t-1".into(),
            away_team_id: "t-2".into(),
            kickoff: Utc::now(),
            state: "scheduled".into(),
            score: None,
        }
    }

    fn options() -> SeedSeasonOptions {
        SeedSeasonOptions {
            season_external_id: "s-2026".into(),
            include_teams: true,
            include_fixtures: true,
            future_only: false,
            dry_run: false,
        }
    }

    async fn run(
        provider: &ScriptedProvider,
        opts: &SeedSeasonOptions,
        fail_team_ids: &[&str],
        fail_season: bool,
    ) -> (MemoryBatchStore, DbId) {
        let store = MemoryBatchStore::default();
        let seasons: StubTarget<SeasonDto> =
            StubTarget::new("season", if fail_season { &["s-2026"] } else { &[] });
        let teams: StubTarget<TeamDto> = StubTarget::new("teams", fail_team_ids);
        let fixtures: StubTarget<FixtureDto> = StubTarget::new("fixtures", &[]);
        let deps = SeedDeps {
            store: &store,
            provider,
            seasons: &seasons,
            teams: &teams,
            fixtures: &fixtures,
        };

        let parent_id = store
            .create(NewSeedBatch {
                kind: KIND_SEED_SEASON.to_string(),
                parent_id: None,
                job_run_id: None,
                dry_run: opts.dry_run,
                items_total: 0,
            })
            .await
            .unwrap();

        execute_seed_season(&deps, parent_id, opts).await.unwrap();
        (store, parent_id)
    }

    // -- Tests --

    #[tokio::test]
    async fn composite_aggregates_all_steps() {
        let provider = ScriptedProvider {
            season: Some(season_dto()),
            teams: Some(vec![team("t-1"), team("t-2")]),
            fixtures: Some(vec![fixture("f-1"), fixture("f-2"), fixture("f-3")]),
        };

        let (store, parent_id) = run(&provider, &options(), &["t-2"], false).await;
        let parent = store.batch(parent_id);

        assert_eq!(parent.status, BatchStatus::Success);
        assert_eq!(parent.items_total, 6);
        assert_eq!(parent.items_success, 5);
        assert_eq!(parent.items_failed, 1);

        let meta = parent.meta.unwrap();
        assert_eq!(meta["kind"], "seed_season");
        assert_eq!(meta["season"]["ok"], 1);
        assert_eq!(meta["teams"]["ok"], 1);
        assert_eq!(meta["teams"]["fail"], 1);
        assert_eq!(meta["fixtures"]["total"], 3);

        // Parent plus one child per step.
        assert_eq!(store.batches().len(), 4);
        assert!(store
            .batches()
            .iter()
            .filter(|b| b.id != parent_id)
            .all(|b| b.parent_id == Some(parent_id)));
    }

    #[tokio::test]
    async fn season_fetch_error_is_fatal() {
        let provider = ScriptedProvider {
            season: None,
            teams: Some(vec![team("t-1")]),
            fixtures: Some(vec![fixture("f-1")]),
        };

        let (store, parent_id) = run(&provider, &options(), &[], false).await;
        let parent = store.batch(parent_id);

        assert_eq!(parent.status, BatchStatus::Failed);
        assert!(parent.error.as_deref().unwrap().contains("provider unavailable"));
        assert_eq!(parent.items_total, 0);

        // The failed season child carries the raw error and no items;
        // teams/fixtures never started.
        let children: Vec<_> = store
            .batches()
            .into_iter()
            .filter(|b| b.parent_id == Some(parent_id))
            .collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].status, BatchStatus::Failed);
        assert!(store.items_for(children[0].id).is_empty());

        let meta = parent.meta.unwrap();
        assert!(meta.get("teams").is_none());
        assert!(meta.get("fixtures").is_none());
    }

    #[tokio::test]
    async fn teams_fetch_error_does_not_fail_composite() {
        let provider = ScriptedProvider {
            season: Some(season_dto()),
            teams: None,
            fixtures: Some(vec![fixture("f-1")]),
        };

        let (store, parent_id) = run(&provider, &options(), &[], false).await;
        let parent = store.batch(parent_id);

        assert_eq!(parent.status, BatchStatus::Success);
        let meta = parent.meta.unwrap();
        assert!(meta["teams"]["error"]
            .as_str()
            .unwrap()
            .contains("provider unavailable"));
        // Fixtures still ran.
        assert_eq!(meta["fixtures"]["ok"], 1);
    }

    #[tokio::test]
    async fn failed_season_step_skips_dependents() {
        let provider = ScriptedProvider {
            season: Some(season_dto()),
            teams: Some(vec![team("t-1")]),
            fixtures: Some(vec![fixture("f-1")]),
        };

        let (store, parent_id) = run(&provider, &options(), &[], true).await;
        let parent = store.batch(parent_id);

        assert_eq!(parent.status, BatchStatus::Failed);
        let meta = parent.meta.unwrap();
        assert_eq!(meta["season"]["fail"], 1);
        assert!(meta.get("teams").is_none());
        assert!(meta.get("fixtures").is_none());
    }

    #[tokio::test]
    async fn include_flags_bound_the_composite() {
        let provider = ScriptedProvider {
            season: Some(season_dto()),
            teams: Some(vec![team("t-1")]),
            fixtures: Some(vec![fixture("f-1")]),
        };
        let opts = SeedSeasonOptions {
            include_teams: false,
            include_fixtures: false,
            ..options()
        };

        let (store, parent_id) = run(&provider, &opts, &[], false).await;
        let parent = store.batch(parent_id);

        assert_eq!(parent.items_total, 1);
        let meta = parent.meta.unwrap();
        assert!(meta.get("teams").is_none());
        assert!(meta.get("fixtures").is_none());
    }

    #[tokio::test]
    async fn parent_is_finalized_exactly_once() {
        let provider = ScriptedProvider {
            season: Some(season_dto()),
            teams: Some(vec![]),
            fixtures: Some(vec![]),
        };

        let (store, parent_id) = run(&provider, &options(), &[], false).await;
        assert_eq!(store.batch(parent_id).finalize_calls, 1);

        // Empty team/fixture steps count as successful steps.
        let meta = store.batch(parent_id).meta.unwrap();
        assert_eq!(meta["teams"]["total"], 0);
        assert_eq!(store.batch(parent_id).status, BatchStatus::Success);
    }
}
