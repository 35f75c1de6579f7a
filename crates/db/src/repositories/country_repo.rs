//! Repository for the `countries` table.

use sqlx::PgPool;
use sportsync_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use crate::models::country::{Country, UpsertCountry};

use super::UpsertOutcome;

/// Column list for `countries` queries.
const COLUMNS: &str = "id, external_id, name, code, created_at, updated_at";

/// Provides upsert-by-external-id and read operations for countries.
pub struct CountryRepo;

impl CountryRepo {
    /// Upsert a country keyed by external id. `inserted` in the outcome
    /// distinguishes a fresh row from an update in place.
    pub async fn upsert(pool: &PgPool, input: &UpsertCountry) -> Result<UpsertOutcome, sqlx::Error> {
        sqlx::query_as::<_, UpsertOutcome>(
            "INSERT INTO countries (external_id, name, code) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (external_id) DO UPDATE \
             SET name = EXCLUDED.name, code = EXCLUDED.code, updated_at = NOW() \
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&input.external_id)
        .bind(&input.name)
        .bind(&input.code)
        .fetch_one(pool)
        .await
    }

    /// Find a country by external id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Country>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM countries WHERE external_id = $1");
        sqlx::query_as::<_, Country>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// List countries by name, paginated.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Country>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!("SELECT {COLUMNS} FROM countries ORDER BY name LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Country>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
