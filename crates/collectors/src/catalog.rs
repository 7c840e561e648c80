//! Event catalog client.
//!
//! Talks to a discovery-style REST catalog, paginating until the provider
//! reports no further pages or the item safety cap is reached, then
//! normalizes every raw item into an [`EventRecord`]. The raw payload is
//! navigated dynamically — the catalog's response schema is the
//! collaborator's detail, not ours.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use model::{EventRecord, TIME_TBD, UserRequest, flags};

use crate::{CollectError, EventCatalog};

const DEFAULT_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2";
const PAGE_SIZE: usize = 200;
/// Safety cap on accumulated raw items; bounds total work on huge cities.
const MAX_ITEMS: usize = 1_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Paginated catalog client with an injected credential.
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different catalog endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build from `CATALOG_API_KEY` (empty key if unset — the provider
    /// will reject it and the failure surfaces through [`CollectError`]).
    pub fn from_env() -> Self {
        Self::new(std::env::var("CATALOG_API_KEY").unwrap_or_default())
    }

    fn page_query(&self, request: &UserRequest, page: usize) -> Vec<(String, String)> {
        let mut query = vec![
            ("apikey".to_string(), self.api_key.clone()),
            ("city".to_string(), request.city.clone()),
            ("countryCode".to_string(), request.country_code.clone()),
            (
                "startDateTime".to_string(),
                format!("{}T00:00:00Z", request.start_date),
            ),
            (
                "endDateTime".to_string(),
                format!("{}T23:59:59Z", request.end_date),
            ),
            ("size".to_string(), PAGE_SIZE.to_string()),
            ("sort".to_string(), "date,asc".to_string()),
            ("page".to_string(), page.to_string()),
        ];
        if let Some(region) = &request.region_code {
            query.push(("stateCode".to_string(), region.clone()));
        }
        if let Some(budget) = request.budget_max {
            query.push(("priceMax".to_string(), budget.to_string()));
        }
        query
    }
}

#[async_trait]
impl EventCatalog for CatalogClient {
    async fn fetch_events(&self, request: &UserRequest) -> Result<Vec<EventRecord>, CollectError> {
        let url = format!("{}/events.json", self.base_url);
        let mut raw_items: Vec<Value> = Vec::new();
        let mut page = 0usize;

        loop {
            debug!("fetching catalog page {page}");
            let response = self
                .client
                .get(&url)
                .timeout(REQUEST_TIMEOUT)
                .query(&self.page_query(request, page))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(CollectError::Api(format!("catalog returned HTTP {status}")));
            }

            let data: Value = response.json().await?;

            if let Some(fault) = data.pointer("/fault/faultstring").and_then(Value::as_str) {
                return Err(CollectError::Api(fault.to_string()));
            }
            let Some(events) = data.pointer("/_embedded/events").and_then(Value::as_array) else {
                break;
            };

            raw_items.extend(events.iter().cloned());

            let total_pages = data
                .pointer("/page/totalPages")
                .and_then(Value::as_u64)
                .unwrap_or(1) as usize;
            page += 1;

            if page >= total_pages || page * PAGE_SIZE >= MAX_ITEMS {
                break;
            }
        }

        info!("catalog returned {} raw items for {}", raw_items.len(), request.city);
        Ok(raw_items.iter().map(parse_event).collect())
    }
}

/// Normalize one raw catalog item.
///
/// Missing fields collapse to empty strings, prices to `0.0` and the start
/// time to the `TBD` sentinel; the weekend/outdoor flags are derived here,
/// once.
pub fn parse_event(raw: &Value) -> EventRecord {
    let text = |pointer: &str| -> String {
        raw.pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    // Geocoordinates arrive as strings in the wire format
    let coord = |pointer: &str| -> f64 {
        raw.pointer(pointer)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0)
    };
    let price = |pointer: &str| -> f64 {
        raw.pointer(pointer).and_then(Value::as_f64).unwrap_or(0.0)
    };

    let date = text("/dates/start/localDate");
    let mut time = text("/dates/start/localTime");
    if time.is_empty() {
        time = TIME_TBD.to_string();
    }

    let venue_name = text("/_embedded/venues/0/name");

    let description = [
        text("/description"),
        text("/info"),
        text("/pleaseNote"),
    ]
    .into_iter()
    .find(|s| !s.is_empty())
    .unwrap_or_default();

    EventRecord {
        id: text("/id"),
        name: text("/name"),
        description,
        is_weekend: flags::is_weekend(&date),
        is_outdoor: flags::is_outdoor(&venue_name),
        date,
        time,
        venue_address: text("/_embedded/venues/0/address/line1"),
        venue_city: text("/_embedded/venues/0/city/name"),
        venue_region: text("/_embedded/venues/0/state/stateCode"),
        latitude: coord("/_embedded/venues/0/location/latitude"),
        longitude: coord("/_embedded/venues/0/location/longitude"),
        venue_name,
        price_min: price("/priceRanges/0/min"),
        price_max: price("/priceRanges/0/max"),
        category: text("/classifications/0/segment/name"),
        genre: text("/classifications/0/genre/name"),
        ticket_url: text("/url"),
        image_url: text("/images/0/url"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_event() {
        let raw = json!({
            "id": "evt-1",
            "name": "Birdland Jazz Night",
            "description": "An evening of live jazz.",
            "url": "https://tickets.example/evt-1",
            "images": [{ "url": "https://img.example/evt-1.jpg" }],
            "dates": { "start": { "localDate": "2026-03-07", "localTime": "20:00" } },
            "priceRanges": [{ "min": 25.0, "max": 60.0 }],
            "classifications": [{
                "segment": { "name": "Music" },
                "genre": { "name": "Jazz" }
            }],
            "_embedded": {
                "venues": [{
                    "name": "Birdland Jazz Club",
                    "address": { "line1": "315 W 44th St" },
                    "city": { "name": "New York" },
                    "state": { "stateCode": "NY" },
                    "location": { "latitude": "40.7590", "longitude": "-73.9910" }
                }]
            }
        });

        let event = parse_event(&raw);

        assert_eq!(event.id, "evt-1");
        assert_eq!(event.name, "Birdland Jazz Night");
        assert_eq!(event.date, "2026-03-07");
        assert_eq!(event.time, "20:00");
        assert_eq!(event.venue_name, "Birdland Jazz Club");
        assert_eq!(event.venue_region, "NY");
        assert_eq!(event.price_min, 25.0);
        assert_eq!(event.price_max, 60.0);
        assert_eq!(event.category, "Music");
        assert_eq!(event.genre, "Jazz");
        assert!((event.latitude - 40.7590).abs() < 1e-9);
        // 2026-03-07 is a Saturday; the club is indoor
        assert!(event.is_weekend);
        assert!(!event.is_outdoor);
    }

    #[test]
    fn test_parse_sparse_event_defaults() {
        let raw = json!({ "id": "evt-2", "name": "Mystery Show" });

        let event = parse_event(&raw);

        assert_eq!(event.time, TIME_TBD);
        assert_eq!(event.date, "");
        assert_eq!(event.price_min, 0.0);
        assert_eq!(event.price_max, 0.0);
        assert_eq!(event.description, "");
        assert_eq!(event.venue_name, "");
        // Unparseable (empty) date is not a weekend
        assert!(!event.is_weekend);
        assert!(!event.is_outdoor);
    }

    #[test]
    fn test_parse_event_description_fallback_chain() {
        let raw = json!({
            "id": "evt-3",
            "name": "Open Air Festival",
            "info": "Gates open at noon.",
            "_embedded": { "venues": [{ "name": "Liberty State Park" }] }
        });

        let event = parse_event(&raw);

        assert_eq!(event.description, "Gates open at noon.");
        assert!(event.is_outdoor);
    }
}
