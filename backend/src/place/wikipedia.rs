//! Wikipedia-backed geo search and page summaries

use reqwest::{StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::instrument;

use super::{Coordinate, GeoSearchApi, GeoSearchHit, PageSummary, PlaceError, SummaryApi};
use crate::{http_client, types::AppConfig};

/// `MediaWiki` geosearch response: `{"query": {"geosearch": [{"title": ...}]}}`
#[derive(Debug, Default, Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    query: GeoSearchQuery,
}

#[derive(Debug, Default, Deserialize)]
struct GeoSearchQuery {
    #[serde(default)]
    geosearch: Vec<GeoSearchHit>,
}

/// HTTP client for the Wikipedia `MediaWiki` action API and REST summary API
pub struct WikipediaClient {
    api_url: String,
    rest_url: String,
    http_client: ClientWithMiddleware,
}

impl WikipediaClient {
    /// Creates a client for the endpoints configured in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            api_url: config.wikipedia_api_url.clone(),
            rest_url: config.wikipedia_rest_url.clone(),
            http_client: http_client::build(config.http_timeout)?,
        })
    }

    fn summary_url(&self, title: &str) -> Result<Url, PlaceError> {
        let mut url = Url::parse(&self.rest_url)
            .map_err(|e| PlaceError::InvalidResponse(format!("Invalid summary URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| PlaceError::InvalidResponse("Summary URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["page", "summary", title]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl GeoSearchApi for WikipediaClient {
    #[instrument(skip(self))]
    async fn search(
        &self,
        coordinate: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<GeoSearchHit>, PlaceError> {
        let gscoord = format!("{}|{}", coordinate.latitude, coordinate.longitude);
        let radius = radius_meters.to_string();
        let limit = limit.to_string();

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "geosearch"),
                ("gscoord", gscoord.as_str()),
                ("gsradius", radius.as_str()),
                ("gslimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaceError::Status(status));
        }

        let body = response.json::<GeoSearchResponse>().await?;
        tracing::debug!(hits = body.query.geosearch.len(), "Geo search completed");
        Ok(body.query.geosearch)
    }
}

#[async_trait::async_trait]
impl SummaryApi for WikipediaClient {
    #[instrument(skip(self))]
    async fn summary(&self, title: &str) -> Result<PageSummary, PlaceError> {
        let url = self.summary_url(title)?;
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        // A page without a summary is a normal outcome, not a failure
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("No summary available");
            return Ok(PageSummary::default());
        }
        if !status.is_success() {
            return Err(PlaceError::Status(status));
        }

        Ok(response.json::<PageSummary>().await?)
    }
}
