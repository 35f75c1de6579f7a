//! Repository for the `odds` table.

use sqlx::PgPool;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use crate::models::odds::{Odds, UpsertOdds};

use super::UpsertOutcome;

/// Column list for `odds` queries.
const COLUMNS: &str = "id, external_id, fixture_external_id, bookmaker_external_id, \
    market, selection, price, created_at, updated_at";

/// Provides upsert-by-external-id and read operations for odds quotes.
pub struct OddsRepo;

impl OddsRepo {
    pub async fn upsert(pool: &PgPool, input: &UpsertOdds) -> Result<UpsertOutcome, sqlx::Error> {
        sqlx::query_as::<_, UpsertOutcome>(
            "INSERT INTO odds \
                 (external_id, fixture_external_id, bookmaker_external_id, \
                  market, selection, price) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (external_id) DO UPDATE \
             SET fixture_external_id = EXCLUDED.fixture_external_id, \
                 bookmaker_external_id = EXCLUDED.bookmaker_external_id, \
                 market = EXCLUDED.market, selection = EXCLUDED.selection, \
                 price = EXCLUDED.price, updated_at = NOW() \
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&input.external_id)
        .bind(&input.fixture_external_id)
        .bind(&input.bookmaker_external_id)
        .bind(&input.market)
        .bind(&input.selection)
        .bind(input.price)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Odds>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM odds WHERE external_id = $1");
        sqlx::query_as::<_, Odds>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// List the quotes recorded for one fixture.
    pub async fn list_by_fixture(
        pool: &PgPool,
        fixture_external_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Odds>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM odds \
             WHERE fixture_external_id = $1 \
             ORDER BY bookmaker_external_id, market \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Odds>(&query)
            .bind(fixture_external_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List recently updated quotes, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Odds>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query =
            format!("SELECT {COLUMNS} FROM odds ORDER BY updated_at DESC LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Odds>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
