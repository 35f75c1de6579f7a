//! Repository for the `fixtures` table.

use sqlx::PgPool;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sportsync_core::types::Timestamp;

use crate::models::fixture::{Fixture, UpsertFixture};

use super::UpsertOutcome;

/// Column list for `fixtures` queries.
const COLUMNS: &str = "id, external_id, season_external_id, home_team_external_id, \
    away_team_external_id, kickoff, state, score, created_at, updated_at";

/// Provides upsert-by-external-id and read operations for fixtures.
pub struct FixtureRepo;

impl FixtureRepo {
    pub async fn upsert(pool: &PgPool, input: &UpsertFixture) -> Result<UpsertOutcome, sqlx::Error> {
        sqlx::query_as::<_, UpsertOutcome>(
            "INSERT INTO fixtures \
                 (external_id, season_external_id, home_team_external_id, \
                  away_team_external_id, kickoff, state, score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (external_id) DO UPDATE \
             SET season_external_id = EXCLUDED.season_external_id, \
                 home_team_external_id = EXCLUDED.home_team_external_id, \
                 away_team_external_id = EXCLUDED.away_team_external_id, \
                 kickoff = EXCLUDED.kickoff, state = EXCLUDED.state, \
                 score = EXCLUDED.score, updated_at = NOW() \
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&input.external_id)
        .bind(&input.season_external_id)
        .bind(&input.home_team_external_id)
        .bind(&input.away_team_external_id)
        .bind(input.kickoff)
        .bind(&input.state)
        .bind(&input.score)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Fixture>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fixtures WHERE external_id = $1");
        sqlx::query_as::<_, Fixture>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// List a season's fixtures, newest kickoff first.
    pub async fn list_by_season(
        pool: &PgPool,
        season_external_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Fixture>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM fixtures \
             WHERE season_external_id = $1 \
             ORDER BY kickoff DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Fixture>(&query)
            .bind(season_external_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Fixtures kicking off after `cutoff`, soonest first. Used by the
    /// odds refresh job to bound provider calls.
    pub async fn list_upcoming(
        pool: &PgPool,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<Fixture>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fixtures \
             WHERE kickoff > $1 \
             ORDER BY kickoff ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Fixture>(&query)
            .bind(cutoff)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
