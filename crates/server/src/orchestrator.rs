//! # Recommendation Orchestrator
//!
//! This module coordinates the search pipeline:
//! 1. Validate the request
//! 2. Collect events and weather in parallel (join, not race)
//! 3. Classify partial collection failure
//! 4. Build the bounded scoring prompt
//! 5. Call the judge and sanitize its reply
//! 6. Rank, truncate to top-N, and return the set
//!
//! Judge-side failures never propagate: a dead or incoherent judge
//! produces a uniformly scored set whose reasons say so. Only a malformed
//! request is an `Err`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use collectors::{EventCatalog, ForecastProvider, collect};
use judge::{ChatMessage, Judge};
use model::{RecommendationSet, UserRequest};
use pipeline::{build_scoring_prompt, rank, rank_fallback, sanitize_scores, scoring_instructions};

/// Main orchestrator that coordinates the recommendation pipeline
pub struct RecommendationOrchestrator {
    catalog: Arc<dyn EventCatalog>,
    forecasts: Arc<dyn ForecastProvider>,
    judge: Arc<dyn Judge>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over the three collaborators.
    pub fn new(
        catalog: Arc<dyn EventCatalog>,
        forecasts: Arc<dyn ForecastProvider>,
        judge: Arc<dyn Judge>,
    ) -> Self {
        Self {
            catalog,
            forecasts,
            judge,
        }
    }

    /// Main entry point: run one search and return the ranked set.
    ///
    /// # Arguments
    /// * `request` - The validated-on-entry search request
    /// * `top_n` - Number of recommendations to return
    ///
    /// # Returns
    /// The ranked [`RecommendationSet`]. A catalog failure yields an empty
    /// set carrying the error; a judge failure yields uniformly scored
    /// events; only request validation can produce an `Err`.
    pub async fn produce_recommendations(
        &self,
        request: UserRequest,
        top_n: usize,
    ) -> Result<RecommendationSet> {
        let start_time = Instant::now();
        request.validate()?;

        info!("collecting events & weather for {}", request.city);
        let collection = collect(self.catalog.as_ref(), self.forecasts.as_ref(), &request).await;

        if let Some(error) = collection.catalog_error {
            warn!("catalog side failed, terminating pipeline: {error}");
            return Ok(RecommendationSet::failed(request, error));
        }
        if let Some(error) = &collection.forecast_error {
            // Missing weather is a valid state, not an error
            info!("continuing without forecasts: {error}");
        }
        if collection.events.is_empty() {
            info!("no candidate events found; the judge is not consulted");
            return Ok(RecommendationSet::empty(request));
        }

        info!("scoring {} candidate events", collection.events.len());
        let prompt = build_scoring_prompt(&request, &collection.events, &collection.forecasts);

        let set = match self
            .judge
            .complete(scoring_instructions(), &[ChatMessage::user(prompt)])
            .await
        {
            Ok(reply) => match sanitize_scores(&reply) {
                Ok(entries) => {
                    info!("judge returned {} score entries", entries.len());
                    rank(request, collection.events, &collection.forecasts, entries, top_n)
                }
                Err(err) => {
                    warn!("judge reply unrecoverable, using fallback scores: {err}");
                    rank_fallback(
                        request,
                        collection.events,
                        &collection.forecasts,
                        top_n,
                        &err.to_string(),
                    )
                }
            },
            Err(err) => {
                warn!("judge call failed, using fallback scores: {err}");
                rank_fallback(
                    request,
                    collection.events,
                    &collection.forecasts,
                    top_n,
                    &err.to_string(),
                )
            }
        };

        info!(
            "produced {} recommendations in {:.2?}",
            set.recommendations.len(),
            start_time.elapsed()
        );
        Ok(set)
    }
}
