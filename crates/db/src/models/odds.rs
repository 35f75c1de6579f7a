use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sportsync_core::reconcile::Reconcilable;
use sportsync_core::types::{DbId, Timestamp};

/// A row from the `odds` table. One row per provider price quote,
/// keyed by the provider's composite quote id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Odds {
    pub id: DbId,
    pub external_id: String,
    pub fixture_external_id: String,
    pub bookmaker_external_id: String,
    pub market: String,
    pub selection: Option<String>,
    pub price: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting an odds quote by external id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertOdds {
    pub external_id: String,
    pub fixture_external_id: String,
    pub bookmaker_external_id: String,
    pub market: String,
    pub selection: Option<String>,
    pub price: f64,
}

impl Reconcilable for Odds {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("fixture", self.fixture_external_id.clone()),
            ("bookmaker", self.bookmaker_external_id.clone()),
            ("market", self.market.clone()),
            ("price", format!("{:.2}", self.price)),
        ];
        if let Some(selection) = &self.selection {
            fields.push(("selection", selection.clone()));
        }
        fields
    }

    fn as_of(&self) -> Option<Timestamp> {
        Some(self.updated_at)
    }
}
