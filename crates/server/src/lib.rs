//! Server crate for the Encore event recommendation engine.
//!
//! This crate exposes the two operations a presentation layer consumes:
//! [`RecommendationOrchestrator::produce_recommendations`] and
//! [`QaOrchestrator::answer_question`]. No other state crosses the
//! boundary — the caller owns the session lifecycle and keeps the
//! conversation log between turns.

pub mod orchestrator;
pub mod qa;

pub use orchestrator::RecommendationOrchestrator;
pub use qa::{QaOrchestrator, QaTurn};
