//! Repository for the `leagues` table.

use sqlx::PgPool;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use crate::models::league::{League, UpsertLeague};

use super::UpsertOutcome;

/// Column list for `leagues` queries.
const COLUMNS: &str = "id, external_id, name, country_code, created_at, updated_at";

/// Provides upsert-by-external-id and read operations for leagues.
pub struct LeagueRepo;

impl LeagueRepo {
    pub async fn upsert(pool: &PgPool, input: &UpsertLeague) -> Result<UpsertOutcome, sqlx::Error> {
        sqlx::query_as::<_, UpsertOutcome>(
            "INSERT INTO leagues (external_id, name, country_code) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (external_id) DO UPDATE \
             SET name = EXCLUDED.name, country_code = EXCLUDED.country_code, updated_at = NOW() \
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&input.external_id)
        .bind(&input.name)
        .bind(&input.country_code)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<League>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leagues WHERE external_id = $1");
        sqlx::query_as::<_, League>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<League>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!("SELECT {COLUMNS} FROM leagues ORDER BY name LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, League>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
