//! Score merge, ordering and truncation.
//!
//! The ranker guarantees a deterministic output regardless of how
//! complete the judge's reply was: every candidate becomes a
//! [`ScoredEvent`], scores are clamped into [0, 100], the sort is stable
//! (ties keep collection order) and the result is truncated to top-N.

use std::collections::HashMap;

use tracing::debug;

use model::{EventRecord, ForecastRecord, RecommendationSet, ScoredEvent, UserRequest};

use crate::sanitize::ScoreEntry;

/// Neutral score assigned to every candidate when the judge call failed
/// or its reply was unrecoverable.
pub const FALLBACK_SCORE: f64 = 50.0;

/// Reason attached to candidates a successful judge reply did not mention.
pub const UNSCORED_REASON: &str = "Not scored by the judge";

/// Merge sanitized scores onto the candidates and produce the ranked set.
///
/// Candidates with no matching entry get score `0` and the fixed
/// "not scored" reason, so judged events always outrank unjudged ones and
/// the output size depends only on the candidate count and `top_n`.
pub fn rank(
    request: UserRequest,
    events: Vec<EventRecord>,
    forecasts: &HashMap<String, ForecastRecord>,
    scores: Vec<ScoreEntry>,
    top_n: usize,
) -> RecommendationSet {
    let mut by_id: HashMap<String, ScoreEntry> = HashMap::with_capacity(scores.len());
    for entry in scores {
        // a duplicate id keeps the judge's last word
        by_id.insert(entry.id.clone(), entry);
    }

    let mut recommendations: Vec<ScoredEvent> = events
        .into_iter()
        .map(|event| {
            let entry = by_id.get(&event.id);
            let relevance_score = entry
                .and_then(|e| e.score)
                .unwrap_or(0.0)
                .clamp(0.0, 100.0);
            let score_reason = entry
                .and_then(|e| e.reason.clone())
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| UNSCORED_REASON.to_string());
            let weather = forecasts.get(&event.date).cloned();
            ScoredEvent {
                event,
                weather,
                relevance_score,
                score_reason,
            }
        })
        .collect();

    // Stable sort: exact ties preserve collection order
    recommendations.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    recommendations.truncate(top_n);

    debug!("ranked {} recommendations", recommendations.len());

    RecommendationSet {
        request,
        recommendations,
        error: None,
    }
}

/// Uniform ranking for a failed or unrecoverable judge call: every
/// candidate gets the neutral [`FALLBACK_SCORE`] and a reason embedding
/// the failure detail. Collection order (date-ascending) is preserved.
pub fn rank_fallback(
    request: UserRequest,
    events: Vec<EventRecord>,
    forecasts: &HashMap<String, ForecastRecord>,
    top_n: usize,
    detail: &str,
) -> RecommendationSet {
    let mut recommendations: Vec<ScoredEvent> = events
        .into_iter()
        .map(|event| {
            let weather = forecasts.get(&event.date).cloned();
            ScoredEvent {
                event,
                weather,
                relevance_score: FALLBACK_SCORE,
                score_reason: format!("Judge unavailable: {detail}"),
            }
        })
        .collect();
    recommendations.truncate(top_n);

    RecommendationSet {
        request,
        recommendations,
        error: None,
    }
}
