use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sportsync_core::reconcile::Reconcilable;
use sportsync_core::types::{DbId, Timestamp};

/// A row from the `bookmakers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bookmaker {
    pub id: DbId,
    pub external_id: String,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a bookmaker by external id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertBookmaker {
    pub external_id: String,
    pub name: String,
}

impl Reconcilable for Bookmaker {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }

    fn as_of(&self) -> Option<Timestamp> {
        Some(self.updated_at)
    }
}
