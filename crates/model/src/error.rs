//! Error types for request validation.
//!
//! A malformed request is rejected here, before any collaborator is
//! contacted. Collaborator-side failures live in the crates that talk to
//! the collaborators (`collectors`, `judge`).

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by [`crate::UserRequest::validate`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No city to search in
    #[error("city must not be empty")]
    EmptyCity,

    /// Nothing to match events against
    #[error("intent description must not be empty")]
    EmptyIntent,

    /// Start date after end date
    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}
