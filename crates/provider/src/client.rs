//! The provider trait and its reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::dto::{
    BookmakerDto, CountryDto, FixtureDto, LeagueDto, OddsDto, SeasonDto, TeamDto,
};
use crate::error::ProviderError;

/// Request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on an error body echoed back into an error message.
const MAX_ERROR_BODY: usize = 512;

/// Typed queries against the upstream sports data provider.
#[async_trait]
pub trait SportsProvider: Send + Sync {
    async fn countries(&self) -> Result<Vec<CountryDto>, ProviderError>;

    async fn leagues(&self) -> Result<Vec<LeagueDto>, ProviderError>;

    async fn bookmakers(&self) -> Result<Vec<BookmakerDto>, ProviderError>;

    async fn season(&self, external_id: &str) -> Result<SeasonDto, ProviderError>;

    async fn teams_by_season(
        &self,
        season_external_id: &str,
    ) -> Result<Vec<TeamDto>, ProviderError>;

    /// A season's fixtures. With `future_only`, only fixtures that have
    /// not kicked off yet are returned.
    async fn fixtures_by_season(
        &self,
        season_external_id: &str,
        future_only: bool,
    ) -> Result<Vec<FixtureDto>, ProviderError>;

    async fn odds_by_fixture(
        &self,
        fixture_external_id: &str,
    ) -> Result<Vec<OddsDto>, ProviderError>;
}

/// HTTP implementation talking JSON to the provider's REST API.
pub struct HttpProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client builds");

        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let mut request = self.http.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut body = body;
            body.truncate(MAX_ERROR_BODY);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(%url, bytes = body.len(), "Provider response received");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SportsProvider for HttpProvider {
    async fn countries(&self) -> Result<Vec<CountryDto>, ProviderError> {
        self.get_json("countries", &[]).await
    }

    async fn leagues(&self) -> Result<Vec<LeagueDto>, ProviderError> {
        self.get_json("leagues", &[]).await
    }

    async fn bookmakers(&self) -> Result<Vec<BookmakerDto>, ProviderError> {
        self.get_json("bookmakers", &[]).await
    }

    async fn season(&self, external_id: &str) -> Result<SeasonDto, ProviderError> {
        self.get_json(&format!("seasons/{external_id}"), &[]).await
    }

    async fn teams_by_season(
        &self,
        season_external_id: &str,
    ) -> Result<Vec<TeamDto>, ProviderError> {
        self.get_json("teams", &[("season", season_external_id)])
            .await
    }

    async fn fixtures_by_season(
        &self,
        season_external_id: &str,
        future_only: bool,
    ) -> Result<Vec<FixtureDto>, ProviderError> {
        let fixtures: Vec<FixtureDto> = self
            .get_json("fixtures", &[("season", season_external_id)])
            .await?;

        if !future_only {
            return Ok(fixtures);
        }

        let now = Utc::now();
        Ok(fixtures.into_iter().filter(|f| f.kickoff > now).collect())
    }

    async fn odds_by_fixture(
        &self,
        fixture_external_id: &str,
    ) -> Result<Vec<OddsDto>, ProviderError> {
        self.get_json("odds", &[("fixture", fixture_external_id)])
            .await
    }
}
