//! Postgres-backed seed targets, one per entity kind.
//!
//! Each target converts a provider DTO into the matching upsert DTO and
//! writes it through the entity repository. Dry runs read instead of
//! write: existence decides whether the reported outcome is `inserted`
//! or `updated`.

use async_trait::async_trait;
use sportsync_core::batch::ItemAction;
use sportsync_db::models::bookmaker::UpsertBookmaker;
use sportsync_db::models::country::UpsertCountry;
use sportsync_db::models::fixture::UpsertFixture;
use sportsync_db::models::league::UpsertLeague;
use sportsync_db::models::odds::UpsertOdds;
use sportsync_db::models::season::UpsertSeason;
use sportsync_db::models::team::UpsertTeam;
use sportsync_db::repositories::{
    BookmakerRepo, CountryRepo, FixtureRepo, LeagueRepo, OddsRepo, SeasonRepo, TeamRepo,
};
use sportsync_db::DbPool;
use sportsync_provider::dto::{
    BookmakerDto, CountryDto, FixtureDto, LeagueDto, OddsDto, SeasonDto, TeamDto,
};

use crate::error::EngineError;
use crate::runner::SeedTarget;

fn action_for(inserted: bool) -> ItemAction {
    if inserted {
        ItemAction::Inserted
    } else {
        ItemAction::Updated
    }
}

pub struct CountryTarget {
    pool: DbPool,
}

impl CountryTarget {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedTarget for CountryTarget {
    type Item = CountryDto;

    fn kind(&self) -> &'static str {
        "countries"
    }

    fn external_id(&self, item: &CountryDto) -> String {
        item.id.clone()
    }

    async fn apply(&self, item: &CountryDto, dry_run: bool) -> Result<ItemAction, EngineError> {
        if dry_run {
            let existing = CountryRepo::find_by_external_id(&self.pool, &item.id).await?;
            return Ok(action_for(existing.is_none()));
        }
        let outcome = CountryRepo::upsert(
            &self.pool,
            &UpsertCountry {
                external_id: item.id.clone(),
                name: item.name.clone(),
                code: item.code.clone(),
            },
        )
        .await?;
        Ok(action_for(outcome.inserted))
    }
}

pub struct LeagueTarget {
    pool: DbPool,
}

impl LeagueTarget {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedTarget for LeagueTarget {
    type Item = LeagueDto;

    fn kind(&self) -> &'static str {
        "leagues"
    }

    fn external_id(&self, item: &LeagueDto) -> String {
        item.id.clone()
    }

    async fn apply(&self, item: &LeagueDto, dry_run: bool) -> Result<ItemAction, EngineError> {
        if dry_run {
            let existing = LeagueRepo::find_by_external_id(&self.pool, &item.id).await?;
            return Ok(action_for(existing.is_none()));
        }
        let outcome = LeagueRepo::upsert(
            &self.pool,
            &UpsertLeague {
                external_id: item.id.clone(),
                name: item.name.clone(),
                country_code: item.country_code.clone(),
            },
        )
        .await?;
        Ok(action_for(outcome.inserted))
    }
}

pub struct TeamTarget {
    pool: DbPool,
}

impl TeamTarget {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedTarget for TeamTarget {
    type Item = TeamDto;

    fn kind(&self) -> &'static str {
        "teams"
    }

    fn external_id(&self, item: &TeamDto) -> String {
        item.id.clone()
    }

    async fn apply(&self, item: &TeamDto, dry_run: bool) -> Result<ItemAction, EngineError> {
        if dry_run {
            let existing = TeamRepo::find_by_external_id(&self.pool, &item.id).await?;
            return Ok(action_for(existing.is_none()));
        }
        let outcome = TeamRepo::upsert(
            &self.pool,
            &UpsertTeam {
                external_id: item.id.clone(),
                name: item.name.clone(),
                code: item.code.clone(),
                country_code: item.country_code.clone(),
            },
        )
        .await?;
        Ok(action_for(outcome.inserted))
    }
}

pub struct SeasonTarget {
    pool: DbPool,
}

impl SeasonTarget {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedTarget for SeasonTarget {
    type Item = SeasonDto;

    fn kind(&self) -> &'static str {
        "season"
    }

    fn external_id(&self, item: &SeasonDto) -> String {
        item.id.clone()
    }

    async fn apply(&self, item: &SeasonDto, dry_run: bool) -> Result<ItemAction, EngineError> {
        if dry_run {
            let existing = SeasonRepo::find_by_external_id(&self.pool, &item.id).await?;
            return Ok(action_for(existing.is_none()));
        }
        let outcome = SeasonRepo::upsert(
            &self.pool,
            &UpsertSeason {
                external_id: item.id.clone(),
                league_external_id: item.league_id.clone(),
                year: item.year,
                start_date: item.start_date,
                end_date: item.end_date,
                current: item.current,
            },
        )
        .await?;
        Ok(action_for(outcome.inserted))
    }
}

pub struct FixtureTarget {
    pool: DbPool,
}

impl FixtureTarget {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedTarget for FixtureTarget {
    type Item = FixtureDto;

    fn kind(&self) -> &'static str {
        "fixtures"
    }

    fn external_id(&self, item: &FixtureDto) -> String {
        item.id.clone()
    }

    async fn apply(&self, item: &FixtureDto, dry_run: bool) -> Result<ItemAction, EngineError> {
        if dry_run {
            let existing = FixtureRepo::find_by_external_id(&self.pool, &item.id).await?;
            return Ok(action_for(existing.is_none()));
        }
        let outcome = FixtureRepo::upsert(
            &self.pool,
            &UpsertFixture {
                external_id: item.id.clone(),
                season_external_id: item.season_id.clone(),
                home_team_external_id: item.home_team_id.clone(),
                away_team_external_id: item.away_team_id.clone(),
                kickoff: item.kickoff,
                state: item.state.clone(),
                score: item.score.clone(),
            },
        )
        .await?;
        Ok(action_for(outcome.inserted))
    }
}

pub struct BookmakerTarget {
    pool: DbPool,
}

impl BookmakerTarget {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedTarget for BookmakerTarget {
    type Item = BookmakerDto;

    fn kind(&self) -> &'static str {
        "bookmakers"
    }

    fn external_id(&self, item: &BookmakerDto) -> String {
        item.id.clone()
    }

    async fn apply(&self, item: &BookmakerDto, dry_run: bool) -> Result<ItemAction, EngineError> {
        if dry_run {
            let existing = BookmakerRepo::find_by_external_id(&self.pool, &item.id).await?;
            return Ok(action_for(existing.is_none()));
        }
        let outcome = BookmakerRepo::upsert(
            &self.pool,
            &UpsertBookmaker {
                external_id: item.id.clone(),
                name: item.name.clone(),
            },
        )
        .await?;
        Ok(action_for(outcome.inserted))
    }
}

pub struct OddsTarget {
    pool: DbPool,
}

impl OddsTarget {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeedTarget for OddsTarget {
    type Item = OddsDto;

    fn kind(&self) -> &'static str {
        "odds"
    }

    fn external_id(&self, item: &OddsDto) -> String {
        item.id.clone()
    }

    /// Quotes for fixtures we do not track are skipped rather than
    /// stored as orphans.
    async fn apply(&self, item: &OddsDto, dry_run: bool) -> Result<ItemAction, EngineError> {
        let fixture = FixtureRepo::find_by_external_id(&self.pool, &item.fixture_id).await?;
        if fixture.is_none() {
            return Ok(ItemAction::Skipped);
        }

        if dry_run {
            let existing = OddsRepo::find_by_external_id(&self.pool, &item.id).await?;
            return Ok(action_for(existing.is_none()));
        }
        let outcome = OddsRepo::upsert(
            &self.pool,
            &UpsertOdds {
                external_id: item.id.clone(),
                fixture_external_id: item.fixture_id.clone(),
                bookmaker_external_id: item.bookmaker_id.clone(),
                market: item.market.clone(),
                selection: item.selection.clone(),
                price: item.price,
            },
        )
        .await?;
        Ok(action_for(outcome.inserted))
    }
}
