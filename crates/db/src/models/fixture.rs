use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sportsync_core::reconcile::Reconcilable;
use sportsync_core::types::{DbId, Timestamp};

/// A row from the `fixtures` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fixture {
    pub id: DbId,
    pub external_id: String,
    pub season_external_id: String,
    pub home_team_external_id: String,
    pub away_team_external_id: String,
    pub kickoff: Timestamp,
    pub state: String,
    pub score: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a fixture by external id.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertFixture {
    pub external_id: String,
    pub season_external_id: String,
    pub home_team_external_id: String,
    pub away_team_external_id: String,
    pub kickoff: Timestamp,
    pub state: String,
    pub score: Option<String>,
}

impl Reconcilable for Fixture {
    fn external_id(&self) -> String {
        self.external_id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("home", self.home_team_external_id.clone()),
            ("away", self.away_team_external_id.clone()),
            ("kickoff", self.kickoff.to_rfc3339()),
            ("state", self.state.clone()),
        ];
        if let Some(score) = &self.score {
            fields.push(("score", score.clone()));
        }
        fields
    }

    /// Kickoff drives both newest-first ordering and the `new`
    /// classification of unplayed provider-side fixtures.
    fn as_of(&self) -> Option<Timestamp> {
        Some(self.kickoff)
    }
}
