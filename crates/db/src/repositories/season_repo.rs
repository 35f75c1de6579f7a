//! Repository for the `seasons` table.

use sqlx::PgPool;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use crate::models::season::{Season, UpsertSeason};

use super::UpsertOutcome;

/// Column list for `seasons` queries.
const COLUMNS: &str = "id, external_id, league_external_id, year, start_date, end_date, \
    current, created_at, updated_at";

/// Provides upsert-by-external-id and read operations for seasons.
pub struct SeasonRepo;

impl SeasonRepo {
    pub async fn upsert(pool: &PgPool, input: &UpsertSeason) -> Result<UpsertOutcome, sqlx::Error> {
        sqlx::query_as::<_, UpsertOutcome>(
            "INSERT INTO seasons \
                 (external_id, league_external_id, year, start_date, end_date, current) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (external_id) DO UPDATE \
             SET league_external_id = EXCLUDED.league_external_id, year = EXCLUDED.year, \
                 start_date = EXCLUDED.start_date, end_date = EXCLUDED.end_date, \
                 current = EXCLUDED.current, updated_at = NOW() \
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&input.external_id)
        .bind(&input.league_external_id)
        .bind(input.year)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.current)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Season>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seasons WHERE external_id = $1");
        sqlx::query_as::<_, Season>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Season>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query =
            format!("SELECT {COLUMNS} FROM seasons ORDER BY year DESC, external_id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Season>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
