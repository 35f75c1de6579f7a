//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod batch_item_repo;
pub mod bookmaker_repo;
pub mod country_repo;
pub mod fixture_repo;
pub mod job_repo;
pub mod job_run_repo;
pub mod league_repo;
pub mod odds_repo;
pub mod season_repo;
pub mod seed_batch_repo;
pub mod team_repo;

pub use batch_item_repo::BatchItemRepo;
pub use bookmaker_repo::BookmakerRepo;
pub use country_repo::CountryRepo;
pub use fixture_repo::FixtureRepo;
pub use job_repo::JobRepo;
pub use job_run_repo::JobRunRepo;
pub use league_repo::LeagueRepo;
pub use odds_repo::OddsRepo;
pub use season_repo::SeasonRepo;
pub use seed_batch_repo::SeedBatchRepo;
pub use team_repo::TeamRepo;

use sportsync_core::types::DbId;

/// Result of an upsert-by-external-id: the row id and whether the row
/// was newly inserted (as opposed to updated in place).
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct UpsertOutcome {
    pub id: DbId,
    pub inserted: bool,
}
