//! Session activity scoring
//!
//! Counts how much the user has explored and asks the backend whether that
//! is enough to offer a scent card. Readiness is always the backend's call.

mod scorer;
mod state;
mod types;

pub use scorer::{ScorerOptions, SessionScorer};
pub use state::{
    ActivitySession, Interaction, ScorerCore, ScorerPhase, ScorerSnapshot, SessionError,
    SessionResult,
};
pub use types::{
    ActivityRequest, ActivityResponse, ContextFilters, GenerateCardResponse, GeneratedCard,
    GenerationContext, SaveCardRequest, SaveCardResponse, StartSessionRequest,
    StartSessionResponse, UpdateContextRequest, DEFAULT_TRIGGER_MESSAGE,
};
