//! Resolving a coordinate to a nearby named place and a short summary of it.
//!
//! The resolver never fails: an empty search result and every upstream
//! failure are turned into fixed sentences the rest of the pipeline can use
//! as-is.

mod error;
mod wikipedia;

use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;

pub use error::PlaceError;
pub use wikipedia::WikipediaClient;

/// Search radius around the coordinate, in meters
pub const SEARCH_RADIUS_METERS: u32 = 10_000;
/// Number of places requested from the geo search
pub const SEARCH_LIMIT: u32 = 1;

/// Summary used when no place lies within the search radius
pub const NOTHING_NOTABLE: &str = "Er is hier niet veel bijzonders.";
/// Summary used when a place service could not be reached
pub const LOOKUP_UNREACHABLE: &str = "Kon geen verbinding maken met de informatiedienst.";
/// Summary used for any other place service failure
pub const LOOKUP_FAILED: &str = "Kon geen informatie ophalen.";

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// One candidate returned by the geo search
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeoSearchHit {
    /// Title of the place's article
    pub title: String,
}

/// Summary service answer for one title
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageSummary {
    /// Short prose summary, when the service has one
    #[serde(default)]
    pub extract: Option<String>,
}

/// How a [`PlaceSummary`] came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceSource {
    /// A place was found near the coordinate
    Found,
    /// The search succeeded but nothing lies within the radius
    NothingNotable,
    /// A place service failed; the summary is a stand-in sentence
    Unavailable,
}

/// Place resolved for a coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSummary {
    /// Title of the nearest place, `None` when nothing was found or the lookup failed
    pub title: Option<String>,
    /// Summary text, always usable in a prompt
    pub extract: String,
    /// Outcome of the lookup
    pub source: PlaceSource,
}

impl PlaceSummary {
    /// Whether the summary stands in for a failed lookup
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.source == PlaceSource::Unavailable
    }

    fn found(title: String, extract: String) -> Self {
        Self {
            title: Some(title),
            extract,
            source: PlaceSource::Found,
        }
    }

    fn nothing_notable() -> Self {
        Self {
            title: None,
            extract: NOTHING_NOTABLE.to_string(),
            source: PlaceSource::NothingNotable,
        }
    }

    fn unavailable(err: &PlaceError) -> Self {
        let extract = if err.is_network() {
            LOOKUP_UNREACHABLE
        } else {
            LOOKUP_FAILED
        };
        Self {
            title: None,
            extract: extract.to_string(),
            source: PlaceSource::Unavailable,
        }
    }

    fn generic(title: String) -> Self {
        let extract = format!("Iets over {title}.");
        Self::found(title, extract)
    }
}

/// Finds named places near a coordinate
#[async_trait::async_trait]
pub trait GeoSearchApi: Send + Sync {
    /// Returns up to `limit` places within `radius_meters`, nearest first
    async fn search(
        &self,
        coordinate: Coordinate,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<GeoSearchHit>, PlaceError>;
}

/// Summarizes a place by title
#[async_trait::async_trait]
pub trait SummaryApi: Send + Sync {
    /// Returns the summary for `title`; a missing page yields no extract
    async fn summary(&self, title: &str) -> Result<PageSummary, PlaceError>;
}

/// Turns a coordinate into a [`PlaceSummary`]
pub struct PlaceResolver {
    geo_search: Arc<dyn GeoSearchApi>,
    summaries: Arc<dyn SummaryApi>,
}

impl PlaceResolver {
    /// Creates a resolver over the given services
    #[must_use]
    pub fn new(geo_search: Arc<dyn GeoSearchApi>, summaries: Arc<dyn SummaryApi>) -> Self {
        Self {
            geo_search,
            summaries,
        }
    }

    /// Resolves the nearest place and its summary.
    ///
    /// Upstream failures are logged and replaced by [`LOOKUP_UNREACHABLE`] or
    /// [`LOOKUP_FAILED`]; an empty search yields [`NOTHING_NOTABLE`].
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn resolve(&self, coordinate: Coordinate) -> PlaceSummary {
        match self.try_resolve(coordinate).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "Place lookup failed, using fallback summary");
                PlaceSummary::unavailable(&e)
            }
        }
    }

    async fn try_resolve(&self, coordinate: Coordinate) -> Result<PlaceSummary, PlaceError> {
        let hits = self
            .geo_search
            .search(coordinate, SEARCH_RADIUS_METERS, SEARCH_LIMIT)
            .await?;

        let Some(GeoSearchHit { title }) = hits.into_iter().next() else {
            tracing::debug!("No place within search radius");
            return Ok(PlaceSummary::nothing_notable());
        };

        let summary = self.summaries.summary(&title).await?;
        match summary.extract.filter(|extract| !extract.trim().is_empty()) {
            Some(extract) => Ok(PlaceSummary::found(title, extract)),
            None => Ok(PlaceSummary::generic(title)),
        }
    }
}

/// Scriptable place services for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use reqwest::StatusCode;

    use super::{Coordinate, GeoSearchApi, GeoSearchHit, PageSummary, PlaceError, SummaryApi};

    /// How a mocked call should fail
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockFailure {
        /// Simulates an unreachable service
        Network,
        /// Simulates a `500` answer
        Status,
    }

    impl MockFailure {
        fn to_error(self) -> PlaceError {
            match self {
                Self::Network => PlaceError::Network("connection refused".to_string()),
                Self::Status => PlaceError::Status(StatusCode::INTERNAL_SERVER_ERROR),
            }
        }
    }

    /// In-process stand-in for the geo-search and summary services
    #[derive(Debug, Default)]
    pub struct MockPlaceApi {
        titles: Vec<String>,
        extract: Option<String>,
        search_failure: Option<MockFailure>,
        summary_failure: Option<MockFailure>,
        search_calls: AtomicUsize,
        summary_titles: Mutex<Vec<String>>,
    }

    impl MockPlaceApi {
        /// Geo search returns `titles`; every summary returns `extract`
        #[must_use]
        pub fn new(titles: &[&str], extract: Option<&str>) -> Self {
            Self {
                titles: titles.iter().map(ToString::to_string).collect(),
                extract: extract.map(ToString::to_string),
                ..Self::default()
            }
        }

        /// Makes every geo search fail
        #[must_use]
        pub fn failing_search(mut self, failure: MockFailure) -> Self {
            self.search_failure = Some(failure);
            self
        }

        /// Makes every summary lookup fail
        #[must_use]
        pub fn failing_summary(mut self, failure: MockFailure) -> Self {
            self.summary_failure = Some(failure);
            self
        }

        /// Number of geo searches performed
        pub fn search_calls(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }

        /// Titles summaries were requested for, in call order
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned
        pub fn summary_titles(&self) -> Vec<String> {
            self.summary_titles.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl GeoSearchApi for MockPlaceApi {
        async fn search(
            &self,
            _coordinate: Coordinate,
            _radius_meters: u32,
            limit: u32,
        ) -> Result<Vec<GeoSearchHit>, PlaceError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(failure) = self.search_failure {
                return Err(failure.to_error());
            }
            Ok(self
                .titles
                .iter()
                .take(limit as usize)
                .map(|title| GeoSearchHit {
                    title: title.clone(),
                })
                .collect())
        }
    }

    #[async_trait::async_trait]
    impl SummaryApi for MockPlaceApi {
        async fn summary(&self, title: &str) -> Result<PageSummary, PlaceError> {
            self.summary_titles.lock().unwrap().push(title.to_string());
            if let Some(failure) = self.summary_failure {
                return Err(failure.to_error());
            }
            Ok(PageSummary {
                extract: self.extract.clone(),
            })
        }
    }
}
