use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sportsync_core::reconcile::Reconcilable;
use sportsync_core::types::{DbId, Timestamp};

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub external_id: String,
    pub name: String,
    pub code: Option<String>,
    pub country_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a team by external id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertTeam {
    pub external_id: String,
    pub name: String,
    pub code: Option<String>,
    pub country_code: Option<String>,
}

impl Reconcilable for Team {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("name", self.name.clone())];
        if let Some(code) = &self.code {
            fields.push(("code", code.clone()));
        }
        if let Some(country) = &self.country_code {
            fields.push(("country", country.clone()));
        }
        fields
    }

    fn as_of(&self) -> Option<Timestamp> {
        Some(self.updated_at)
    }
}
