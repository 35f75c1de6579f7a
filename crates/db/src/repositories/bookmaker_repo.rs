//! Repository for the `bookmakers` table.

use sqlx::PgPool;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use crate::models::bookmaker::{Bookmaker, UpsertBookmaker};

use super::UpsertOutcome;

/// Column list for `bookmakers` queries.
const COLUMNS: &str = "id, external_id, name, created_at, updated_at";

/// Provides upsert-by-external-id and read operations for bookmakers.
pub struct BookmakerRepo;

impl BookmakerRepo {
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertBookmaker,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        sqlx::query_as::<_, UpsertOutcome>(
            "INSERT INTO bookmakers (external_id, name) \
             VALUES ($1, $2) \
             ON CONFLICT (external_id) DO UPDATE \
             SET name = EXCLUDED.name, updated_at = NOW() \
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&input.external_id)
        .bind(&input.name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Bookmaker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookmakers WHERE external_id = $1");
        sqlx::query_as::<_, Bookmaker>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Bookmaker>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!("SELECT {COLUMNS} FROM bookmakers ORDER BY name LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Bookmaker>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
