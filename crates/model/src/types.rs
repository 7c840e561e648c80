//! Core domain types for the event recommendation pipeline.
//!
//! Everything in this module is plain data: constructed once by the
//! collection stage, then read by the scoring, ranking and Q&A stages.
//! Derived flags (`is_weekend`, `is_outdoor`, `is_suitable_outdoor`) are
//! computed by the pure functions in [`crate::flags`] at normalization
//! time and never recomputed afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Catalog-assigned stable identifier for an event
pub type EventId = String;

/// Sentinel for events whose start time the catalog does not know yet
pub const TIME_TBD: &str = "TBD";

// =============================================================================
// Request
// =============================================================================

/// A single search request, immutable once created.
///
/// One `UserRequest` is constructed per search; the same value is carried
/// through collection, scoring and into the resulting
/// [`RecommendationSet`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequest {
    pub city: String,
    /// State/province code, e.g. "NY"
    pub region_code: Option<String>,
    pub country_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Free-text description of what the user is looking for
    pub intent: String,
    /// Indoor/outdoor or named-venue preference, if the user stated one
    pub venue_preference: Option<String>,
    /// Budget ceiling in dollars; `None` means no limit
    pub budget_max: Option<f64>,
}

impl UserRequest {
    /// Reject malformed requests before any collaborator call is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.city.trim().is_empty() {
            return Err(ValidationError::EmptyCity);
        }
        if self.intent.trim().is_empty() {
            return Err(ValidationError::EmptyIntent);
        }
        if self.start_date > self.end_date {
            return Err(ValidationError::InvertedDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Collected data
// =============================================================================

/// A normalized catalog event.
///
/// Created once per catalog item at collection time; never mutated
/// afterwards. Price fields default to `0.0` when the catalog omits them —
/// they are always numeric, never unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, or [`TIME_TBD`]
    pub time: String,
    pub venue_name: String,
    pub venue_address: String,
    pub venue_city: String,
    pub venue_region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub category: String,
    pub genre: String,
    pub ticket_url: String,
    pub image_url: String,
    /// Derived: event date falls on Fri/Sat/Sun (false on unparseable dates)
    pub is_weekend: bool,
    /// Derived: venue name matches the outdoor keyword set
    pub is_outdoor: bool,
}

/// One calendar day of forecast data. Forecast maps are keyed by the
/// `date` string, one record per day in the (horizon-trimmed) range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// `YYYY-MM-DD`
    pub date: String,
    pub temp_min_f: f64,
    pub temp_max_f: f64,
    pub description: String,
    /// 0–100
    pub precipitation_chance: f64,
    pub wind_speed_mph: f64,
    /// Derived: weather code not in the bad set, rain < 50%, wind < 25 mph
    pub is_suitable_outdoor: bool,
}

// =============================================================================
// Ranked output
// =============================================================================

/// An event with its judge-assigned relevance score and, when a forecast
/// exists for the event's date, that day's weather.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEvent {
    pub event: EventRecord,
    pub weather: Option<ForecastRecord>,
    /// Always within [0, 100]
    pub relevance_score: f64,
    /// One sentence explaining the score
    pub score_reason: String,
}

/// The ranked result of one search: the originating request plus the
/// top-N scored events, sorted descending by score.
///
/// This is the unit handed to the Q&A subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub request: UserRequest,
    pub recommendations: Vec<ScoredEvent>,
    /// Set when the catalog side of collection failed and the pipeline
    /// terminated early; an empty list with no error means the search
    /// genuinely found nothing.
    pub error: Option<String>,
}

impl RecommendationSet {
    /// An empty result for a search that found no candidates.
    pub fn empty(request: UserRequest) -> Self {
        Self {
            request,
            recommendations: Vec::new(),
            error: None,
        }
    }

    /// An empty result for a search whose catalog fetch failed.
    pub fn failed(request: UserRequest, error: impl Into<String>) -> Self {
        Self {
            request,
            recommendations: Vec::new(),
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// Who produced a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn fragment in the follow-up conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation history.
///
/// The log is never mutated in place: [`ConversationLog::append_turn`]
/// returns a new log and the caller keeps the authoritative copy between
/// turns. Every turn appends exactly one (user, assistant) pair, so the
/// length is always even.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    messages: Vec<ConversationMessage>,
}

impl ConversationLog {
    /// A fresh, empty log for a new search session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Produce a new log with the (question, answer) pair appended.
    pub fn append_turn(&self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        let mut messages = self.messages.clone();
        messages.push(ConversationMessage::user(question));
        messages.push(ConversationMessage::assistant(answer));
        Self { messages }
    }
}
