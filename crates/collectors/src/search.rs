//! Supplementary web-search client.
//!
//! Only used to enrich events whose catalog description is empty before
//! the Q&A stage. The caller treats any failure as "no enrichment" — this
//! collaborator is never allowed to block a turn.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{CollectError, SearchProvider};

const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const RESULT_LIMIT: usize = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// One search result
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Search-API client with an injected credential.
pub struct WebSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WebSearchClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build from `SEARCH_API_KEY`; `None` when unset, since search is an
    /// optional collaborator.
    pub fn from_env() -> Option<Self> {
        std::env::var("SEARCH_API_KEY").ok().map(Self::new)
    }
}

#[async_trait]
impl SearchProvider for WebSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollectError> {
        debug!("search query: {query}");
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", "5"),
                ("api_key", &self.api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::Api(format!("search returned HTTP {status}")));
        }

        let data: Value = response.json().await?;
        Ok(parse_hits(&data))
    }
}

fn parse_hits(data: &Value) -> Vec<SearchHit> {
    let Some(results) = data.get("organic_results").and_then(Value::as_array) else {
        return Vec::new();
    };

    results
        .iter()
        .take(RESULT_LIMIT)
        .map(|result| {
            let text = |field: &str| -> String {
                result
                    .get(field)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            SearchHit {
                title: text("title"),
                snippet: text("snippet"),
                url: text("link"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_hits_takes_top_results() {
        let data = json!({
            "organic_results": [
                { "title": "A", "snippet": "about A", "link": "https://a.example" },
                { "title": "B", "snippet": "about B", "link": "https://b.example" },
                { "title": "C", "snippet": "about C", "link": "https://c.example" },
                { "title": "D", "snippet": "about D", "link": "https://d.example" }
            ]
        });

        let hits = parse_hits(&data);
        assert_eq!(hits.len(), RESULT_LIMIT);
        assert_eq!(hits[0].title, "A");
        assert_eq!(hits[2].url, "https://c.example");
    }

    #[test]
    fn test_parse_hits_missing_results() {
        assert!(parse_hits(&json!({})).is_empty());
        assert!(parse_hits(&json!({ "organic_results": [] })).is_empty());
    }

    #[test]
    fn test_parse_hits_partial_fields() {
        let data = json!({ "organic_results": [ { "title": "Only title" } ] });
        let hits = parse_hits(&data);
        assert_eq!(hits[0].title, "Only title");
        assert_eq!(hits[0].snippet, "");
    }
}
