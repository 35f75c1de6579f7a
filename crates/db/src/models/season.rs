use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sportsync_core::reconcile::Reconcilable;
use sportsync_core::types::{DbId, Timestamp};

/// A row from the `seasons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Season {
    pub id: DbId,
    pub external_id: String,
    pub league_external_id: String,
    pub year: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a season by external id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSeason {
    pub external_id: String,
    pub league_external_id: String,
    pub year: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
}

impl Reconcilable for Season {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("league", self.league_external_id.clone()),
            ("year", self.year.to_string()),
            ("current", self.current.to_string()),
        ];
        if let Some(start) = self.start_date {
            fields.push(("start", start.to_string()));
        }
        if let Some(end) = self.end_date {
            fields.push(("end", end.to_string()));
        }
        fields
    }

    fn as_of(&self) -> Option<Timestamp> {
        Some(self.updated_at)
    }
}
