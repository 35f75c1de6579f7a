//! Provider-side entity DTOs.
//!
//! The provider serializes external ids as either JSON strings or numbers
//! depending on the entity; [`de_external_id`] accepts both and stores the
//! canonical string form, which is the join key against our own rows.

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde::Serialize;
use sportsync_core::reconcile::Reconcilable;
use sportsync_core::types::Timestamp;

/// Accept a string or integer id and normalize it to a string.
fn de_external_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl de::Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a string or integer id")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDto {
    #[serde(deserialize_with = "de_external_id")]
    pub id: String,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueDto {
    #[serde(deserialize_with = "de_external_id")]
    pub id: String,
    pub name: String,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    #[serde(deserialize_with = "de_external_id")]
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDto {
    #[serde(deserialize_with = "de_external_id")]
    pub id: String,
    #[serde(deserialize_with = "de_external_id")]
    pub league_id: String,
    pub year: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureDto {
    #[serde(deserialize_with = "de_external_id")]
    pub id: String,
    #[serde(deserialize_with = "de_external_id")]
    pub season_id: String,
    #[serde(deserialize_with = "de_external_id")]
    pub home_team_id: String,
    #[serde(deserialize_with = "de_external_id")]
    pub away_team_id: String,
    pub kickoff: Timestamp,
    pub state: String,
    pub score: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmakerDto {
    #[serde(deserialize_with = "de_external_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsDto {
    #[serde(deserialize_with = "de_external_id")]
    pub id: String,
    #[serde(deserialize_with = "de_external_id")]
    pub fixture_id: String,
    #[serde(deserialize_with = "de_external_id")]
    pub bookmaker_id: String,
    pub market: String,
    pub selection: Option<String>,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Reconcilable impls (field names match the store-side models)
// ---------------------------------------------------------------------------

impl Reconcilable for CountryDto {
    fn external_id(&self) -> String {
        self.id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("name", self.name.clone())];
        if let Some(code) = &self.code {
            fields.push(("code", code.clone()));
        }
        fields
    }
}

impl Reconcilable for LeagueDto {
    fn external_id(&self) -> String {
        self.id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("name", self.name.clone())];
        if let Some(country) = &self.country_code {
            fields.push(("country", country.clone()));
        }
        fields
    }
}

impl Reconcilable for TeamDto {
    fn external_id(&self) -> String {
        self.id.clone()
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
}

impl Reconcilable for SeasonDto {
    fn external_id(&self) -> String {
        self.id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("league", self.league_id.clone()),
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
}

impl Reconcilable for FixtureDto {
    fn external_id(&self) -> String {
        self.id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("home", self.home_team_id.clone()),
            ("away", self.away_team_id.clone()),
            ("kickoff", self.kickoff.to_rfc3339()),
            ("state", self.state.clone()),
        ];
        if let Some(score) = &self.score {
            fields.push(("score", score.clone()));
        }
        fields
    }

    fn as_of(&self) -> Option<Timestamp> {
        Some(self.kickoff)
    }
}

impl Reconcilable for BookmakerDto {
    fn external_id(&self) -> String {
        self.id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}

impl Reconcilable for OddsDto {
    fn external_id(&self) -> String {
        self.id.clone()
    }

    fn comparable_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("fixture", self.fixture_id.clone()),
            ("bookmaker", self.bookmaker_id.clone()),
            ("market", self.market.clone()),
            ("price", format!("{:.2}", self.price)),
        ];
        if let Some(selection) = &self.selection {
            fields.push(("selection", selection.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_strings_and_numbers() {
        let from_number: CountryDto =
            serde_json::from_str(r#"{"id": 42, "name": "England", "code": "GB"}"#).unwrap();
        assert_eq!(from_number.id, "42");

        let from_string: CountryDto =
            serde_json::from_str(r#"{"id": "42", "name": "England", "code": "GB"}"#).unwrap();
        assert_eq!(from_string.id, "42");
    }

    #[test]
    fn fixture_decodes_nested_ids() {
        let json = r#"{
            "id": 9001,
            "seasonId": "s-2026",
            "homeTeamId": 10,
            "awayTeamId": "11",
            "kickoff": "2026-08-15T17:30:00Z",
            "state": "scheduled",
            "score": null
        }"#;
        let fixture: FixtureDto = serde_json::from_str(json).unwrap();
        assert_eq!(fixture.id, "9001");
        assert_eq!(fixture.season_id, "s-2026");
        assert_eq!(fixture.home_team_id, "10");
        assert_eq!(fixture.away_team_id, "11");
        assert!(fixture.score.is_none());
    }

    #[test]
    fn season_current_defaults_false() {
        let season: SeasonDto = serde_json::from_str(
            r#"{"id": "s1", "leagueId": "l1", "year": 2026}"#,
        )
        .unwrap();
        assert!(!season.current);
        assert!(season.start_date.is_none());
    }
}
