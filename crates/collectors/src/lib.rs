//! # Collectors Crate
//!
//! Collaborator clients for the data-collection stage, plus the two-task
//! fan-out that runs them.
//!
//! ## Components
//!
//! - **catalog**: paginated event catalog client, normalizing raw items
//!   into [`EventRecord`]s
//! - **weather**: geocoding + daily forecast client, normalizing into
//!   [`ForecastRecord`]s keyed by date
//! - **search**: optional web-search client used to enrich sparse event
//!   descriptions before Q&A
//! - [`collect`]: run catalog and forecast fetches concurrently, join
//!   both, and classify partial failure
//!
//! Each collaborator sits behind an async trait so the orchestrator can be
//! tested against scripted implementations.

pub mod catalog;
pub mod search;
pub mod weather;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use model::{EventRecord, ForecastRecord, UserRequest};

// Re-export the concrete clients
pub use catalog::CatalogClient;
pub use search::{SearchHit, WebSearchClient};
pub use weather::WeatherClient;

/// Errors from a collaborator round-trip
#[derive(Error, Debug)]
pub enum CollectError {
    /// Transport failure or timeout
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The collaborator answered, but with a fault of its own
    #[error("collaborator fault: {0}")]
    Api(String),

    /// The forecast provider could not resolve the city
    #[error("cannot geocode city: {0}")]
    Geocode(String),
}

/// Event catalog collaborator: returns every matching event, already
/// normalized, accumulated across pages.
#[async_trait]
pub trait EventCatalog: Send + Sync {
    async fn fetch_events(&self, request: &UserRequest) -> Result<Vec<EventRecord>, CollectError>;
}

/// Forecast collaborator: one record per calendar day in the requested
/// range, trimmed to the provider's forecast horizon, keyed by date.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch_forecast(
        &self,
        request: &UserRequest,
    ) -> Result<HashMap<String, ForecastRecord>, CollectError>;
}

/// Optional web-search collaborator for description enrichment.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollectError>;
}

/// Joined output of the collection fan-out.
///
/// Both sides are always present: a failed side contributes an empty
/// payload plus its error string, so the caller can classify partial
/// failure without losing the surviving half.
#[derive(Debug, Default)]
pub struct Collection {
    pub events: Vec<EventRecord>,
    pub forecasts: HashMap<String, ForecastRecord>,
    pub catalog_error: Option<String>,
    pub forecast_error: Option<String>,
}

/// Run the catalog and forecast fetches concurrently and join both.
///
/// Exactly two units of work, no data dependency between them, and a
/// blocking join — nothing downstream sees a partial result. Neither
/// outcome is discarded when the other fails.
pub async fn collect(
    catalog: &dyn EventCatalog,
    forecasts: &dyn ForecastProvider,
    request: &UserRequest,
) -> Collection {
    let (catalog_result, forecast_result) = tokio::join!(
        catalog.fetch_events(request),
        forecasts.fetch_forecast(request),
    );

    let (events, catalog_error) = match catalog_result {
        Ok(events) => (events, None),
        Err(err) => {
            warn!("catalog fetch failed: {err}");
            (Vec::new(), Some(err.to_string()))
        }
    };

    let (forecast_map, forecast_error) = match forecast_result {
        Ok(map) => (map, None),
        Err(err) => {
            warn!("forecast fetch failed: {err}");
            (HashMap::new(), Some(err.to_string()))
        }
    };

    info!(
        "collection joined: {} events, {} forecast days",
        events.len(),
        forecast_map.len()
    );

    Collection {
        events,
        forecasts: forecast_map,
        catalog_error,
        forecast_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use model::flags;

    fn test_request() -> UserRequest {
        UserRequest {
            city: "New York".to_string(),
            region_code: Some("NY".to_string()),
            country_code: "US".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            intent: "live jazz".to_string(),
            venue_preference: None,
            budget_max: None,
        }
    }

    fn test_event(id: &str, date: &str) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            name: format!("Event {id}"),
            description: String::new(),
            date: date.to_string(),
            time: "20:00".to_string(),
            venue_name: "City Theatre".to_string(),
            venue_address: String::new(),
            venue_city: "New York".to_string(),
            venue_region: "NY".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            price_min: 25.0,
            price_max: 60.0,
            category: "Music".to_string(),
            genre: "Jazz".to_string(),
            ticket_url: String::new(),
            image_url: String::new(),
            is_weekend: flags::is_weekend(date),
            is_outdoor: false,
        }
    }

    struct OkCatalog;
    struct FailingCatalog;
    struct OkForecast;
    struct FailingForecast;

    #[async_trait]
    impl EventCatalog for OkCatalog {
        async fn fetch_events(
            &self,
            _request: &UserRequest,
        ) -> Result<Vec<EventRecord>, CollectError> {
            Ok(vec![test_event("a", "2026-03-06"), test_event("b", "2026-03-07")])
        }
    }

    #[async_trait]
    impl EventCatalog for FailingCatalog {
        async fn fetch_events(
            &self,
            _request: &UserRequest,
        ) -> Result<Vec<EventRecord>, CollectError> {
            Err(CollectError::Api("catalog is down".to_string()))
        }
    }

    #[async_trait]
    impl ForecastProvider for OkForecast {
        async fn fetch_forecast(
            &self,
            _request: &UserRequest,
        ) -> Result<HashMap<String, ForecastRecord>, CollectError> {
            let mut map = HashMap::new();
            map.insert(
                "2026-03-07".to_string(),
                ForecastRecord {
                    date: "2026-03-07".to_string(),
                    temp_min_f: 40.0,
                    temp_max_f: 55.0,
                    description: "Clear sky".to_string(),
                    precipitation_chance: 10.0,
                    wind_speed_mph: 5.0,
                    is_suitable_outdoor: true,
                },
            );
            Ok(map)
        }
    }

    #[async_trait]
    impl ForecastProvider for FailingForecast {
        async fn fetch_forecast(
            &self,
            _request: &UserRequest,
        ) -> Result<HashMap<String, ForecastRecord>, CollectError> {
            Err(CollectError::Geocode("Atlantis".to_string()))
        }
    }

    #[tokio::test]
    async fn test_collect_joins_both_sides() {
        let collection = collect(&OkCatalog, &OkForecast, &test_request()).await;

        assert_eq!(collection.events.len(), 2);
        assert_eq!(collection.forecasts.len(), 1);
        assert!(collection.catalog_error.is_none());
        assert!(collection.forecast_error.is_none());
    }

    #[tokio::test]
    async fn test_catalog_failure_keeps_forecast_side() {
        let collection = collect(&FailingCatalog, &OkForecast, &test_request()).await;

        // The failed side is empty but its error survives; the healthy
        // side is untouched
        assert!(collection.events.is_empty());
        assert!(collection.catalog_error.as_deref().unwrap().contains("catalog is down"));
        assert_eq!(collection.forecasts.len(), 1);
        assert!(collection.forecast_error.is_none());
    }

    #[tokio::test]
    async fn test_forecast_failure_keeps_catalog_side() {
        let collection = collect(&OkCatalog, &FailingForecast, &test_request()).await;

        assert_eq!(collection.events.len(), 2);
        assert!(collection.catalog_error.is_none());
        assert!(collection.forecasts.is_empty());
        assert!(collection.forecast_error.as_deref().unwrap().contains("Atlantis"));
    }
}
