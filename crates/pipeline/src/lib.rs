//! Pipeline stages between collection and the ranked result.
//!
//! This crate provides the pure (non-I/O) middle of the recommendation
//! pipeline:
//! - **prompt**: bounded scoring-prompt construction for the judge
//! - **sanitize**: recovery of a structured score array from the judge's
//!   unreliable text reply
//! - **ranker**: score merge, stable descending sort, top-N truncation,
//!   and the uniform fallback for judge failures
//! - **context**: the Q&A grounding block and instructions
//!
//! ## Architecture
//! The stages compose left to right:
//! 1. `prompt::build_scoring_prompt` turns candidates + weather into judge input
//! 2. `sanitize::sanitize_scores` turns the judge's reply into score entries
//! 3. `ranker::rank` merges entries onto candidates and produces the set
//! 4. `context::build_grounding_block` renders the set for follow-up turns

pub mod context;
pub mod prompt;
pub mod ranker;
pub mod sanitize;

// Re-export main types
pub use context::{build_grounding_block, qa_instructions};
pub use prompt::{MAX_PROMPT_CANDIDATES, build_scoring_prompt, scoring_instructions};
pub use ranker::{FALLBACK_SCORE, UNSCORED_REASON, rank, rank_fallback};
pub use sanitize::{SanitizeError, ScoreEntry, sanitize_scores};
