//! # Model Crate
//!
//! Domain types shared by every stage of the event recommendation
//! pipeline.
//!
//! ## Main Components
//!
//! - **types**: request, event, forecast, ranked-output and conversation types
//! - **flags**: pure functions deriving the weekend/outdoor/suitability flags
//! - **error**: request validation errors
//!
//! This crate does no I/O. Collaborator payloads are normalized into these
//! types by the `collectors` crate; everything downstream only reads them.

// Public modules
pub mod error;
pub mod flags;
pub mod types;

// Re-export commonly used types for convenience
pub use error::ValidationError;
pub use flags::{is_outdoor, is_suitable_outdoor, is_weekend, weather_description};
pub use types::{
    // Type aliases
    EventId,
    TIME_TBD,
    // Core types
    UserRequest,
    EventRecord,
    ForecastRecord,
    ScoredEvent,
    RecommendationSet,
    // Conversation
    Role,
    ConversationMessage,
    ConversationLog,
};
