//! Activity scorer state machine
//!
//! `ScorerCore` holds every counter and flag and makes every transition,
//! synchronously. The async `SessionScorer` drives it from timer ticks,
//! user interactions and backend responses.

use super::types::{ActivityRequest, ActivityResponse, GeneratedCard, DEFAULT_TRIGGER_MESSAGE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::client::ClientError;
use crate::graph::NodeId;
use crate::storage::StorageError;

/// Errors surfaced by the activity scorer
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active session")]
    NoSession,

    #[error("card trigger is not ready")]
    NotReady,

    #[error("card generation already in progress")]
    AlreadyGenerating,

    #[error("saving a card requires a signed-in member")]
    NotAuthenticated,

    #[error("no generated card to save")]
    NoCard,

    #[error("card generation failed: {0}")]
    Generation(String),

    #[error("card save failed: {0}")]
    Save(String),

    #[error("Backend error: {0}")]
    Backend(#[from] ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Whether retrying the same call can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Save(_) | Self::Backend(_))
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerPhase {
    #[default]
    Idle,
    Active,
    TriggerReady,
    Generating,
    PostGenerate,
}

/// A user action that counts as one interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    PerfumeClicked { perfume_id: i64 },
    AccordClicked { accord: String },
    FilterChanged { group: String },
}

impl Interaction {
    /// Click on a perfume node; accord and non-numeric ids are not perfumes
    pub fn perfume(id: &NodeId) -> Option<Self> {
        id.as_numeric().map(|perfume_id| Self::PerfumeClicked { perfume_id })
    }

    pub fn accord(accord: impl Into<String>) -> Self {
        Self::AccordClicked { accord: accord.into() }
    }

    pub fn filter(group: impl Into<String>) -> Self {
        Self::FilterChanged { group: group.into() }
    }
}

/// Counters for one backend session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySession {
    pub session_id: String,
    pub dwell_time_seconds: u64,
    pub interaction_count: u64,
    pub card_trigger_ready: bool,
    pub last_trigger_message: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl ActivitySession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            dwell_time_seconds: 0,
            interaction_count: 0,
            card_trigger_ready: false,
            last_trigger_message: None,
            started_at: Utc::now(),
        }
    }
}

/// Point-in-time view of the scorer, for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorerSnapshot {
    pub phase: ScorerPhase,
    pub session_id: Option<String>,
    pub dwell_time_seconds: u64,
    pub interaction_count: u64,
    pub card_trigger_ready: bool,
    pub prompt_visible: bool,
    pub trigger_message: Option<String>,
    pub daily_limit_reached: Option<bool>,
    pub daily_limit_remaining: Option<i64>,
    pub last_error: Option<String>,
    pub card: Option<GeneratedCard>,
}

#[derive(Debug, Default)]
pub struct ScorerCore {
    phase: ScorerPhase,
    session: Option<ActivitySession>,
    prompt_visible: bool,
    prompt_dismissed: bool,
    daily_limit_reached: Option<bool>,
    daily_limit_remaining: Option<i64>,
    last_error: Option<String>,
    card: Option<GeneratedCard>,
}

impl ScorerCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScorerPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&ActivitySession> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    pub fn card(&self) -> Option<&GeneratedCard> {
        self.card.as_ref()
    }

    fn is_current(&self, session_id: &str) -> bool {
        self.session_id() == Some(session_id)
    }

    /// Start counting for a new (or reused) session id
    ///
    /// Replaces any previous session: counters, readiness and the prompt
    /// all start over.
    pub fn begin_session(&mut self, session_id: impl Into<String>) {
        let session = ActivitySession::new(session_id);
        tracing::info!(session_id = %session.session_id, "activity session started");
        self.session = Some(session);
        self.phase = ScorerPhase::Active;
        self.prompt_visible = false;
        self.prompt_dismissed = false;
    }

    /// One dwell second for `session_id`; false once that session is gone
    pub fn tick(&mut self, session_id: &str) -> bool {
        match self.session.as_mut() {
            Some(session) if session.session_id == session_id => {
                session.dwell_time_seconds += 1;
                true
            }
            _ => false,
        }
    }

    /// Count an interaction and build the activity log for it
    ///
    /// Returns `None` when no session exists yet.
    pub fn record(
        &mut self,
        interaction: &Interaction,
        selected_accords: Vec<String>,
    ) -> Option<(String, ActivityRequest)> {
        let session = self.session.as_mut()?;
        session.interaction_count += 1;

        let mut request = ActivityRequest {
            accord_selected: None,
            filter_changed: None,
            perfume_id: None,
            selected_accords,
            dwell_time: session.dwell_time_seconds,
            interaction_count: session.interaction_count,
        };
        match interaction {
            Interaction::PerfumeClicked { perfume_id } => request.perfume_id = Some(*perfume_id),
            Interaction::AccordClicked { accord } => request.accord_selected = Some(accord.clone()),
            Interaction::FilterChanged { group } => request.filter_changed = Some(group.clone()),
        }

        let session_id = session.session_id.clone();
        if self.phase == ScorerPhase::PostGenerate {
            self.phase = ScorerPhase::Active;
        }
        Some((session_id, request))
    }

    /// Fold in the backend's answer to an activity log
    ///
    /// Answers for a superseded session are ignored. Readiness latches: a
    /// later `false` does not clear it.
    pub fn apply_activity(&mut self, session_id: &str, response: &ActivityResponse) -> bool {
        if !self.is_current(session_id) {
            tracing::debug!(session_id, "ignoring activity response for superseded session");
            return false;
        }
        if response.daily_limit_reached.is_some() {
            self.daily_limit_reached = response.daily_limit_reached;
        }
        if response.daily_limit_remaining.is_some() {
            self.daily_limit_remaining = response.daily_limit_remaining;
        }
        if !response.card_trigger_ready {
            return true;
        }

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let newly_ready = !session.card_trigger_ready;
        session.card_trigger_ready = true;
        session.last_trigger_message = Some(
            response
                .trigger_message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_TRIGGER_MESSAGE.to_string()),
        );

        match self.phase {
            ScorerPhase::Active | ScorerPhase::PostGenerate => {
                self.phase = ScorerPhase::TriggerReady;
            }
            ScorerPhase::Idle | ScorerPhase::TriggerReady | ScorerPhase::Generating => {}
        }
        if self.phase == ScorerPhase::TriggerReady && !self.prompt_dismissed && !self.prompt_visible {
            self.prompt_visible = true;
        }
        if newly_ready {
            tracing::info!(session_id, "card trigger ready");
        }
        true
    }

    /// Hide the prompt; it stays hidden until generation is invoked
    pub fn dismiss_prompt(&mut self) {
        self.prompt_visible = false;
        self.prompt_dismissed = true;
    }

    /// Enter `Generating`, returning the session id to generate for
    pub fn begin_generation(&mut self) -> SessionResult<String> {
        let session = self.session.as_ref().ok_or(SessionError::NoSession)?;
        if self.phase == ScorerPhase::Generating {
            return Err(SessionError::AlreadyGenerating);
        }
        if !session.card_trigger_ready {
            return Err(SessionError::NotReady);
        }
        let session_id = session.session_id.clone();
        self.phase = ScorerPhase::Generating;
        self.prompt_visible = false;
        self.prompt_dismissed = false;
        self.last_error = None;
        Ok(session_id)
    }

    /// Leave `Generating` after a failure; counters are kept
    pub fn generation_failed(&mut self, error: impl Into<String>) {
        let error = error.into();
        tracing::warn!(%error, "card generation failed");
        self.last_error = Some(error);
        let ready = self.session.as_ref().is_some_and(|s| s.card_trigger_ready);
        self.phase = if ready {
            ScorerPhase::TriggerReady
        } else {
            ScorerPhase::Active
        };
    }

    /// Leave `Generating` with a card
    ///
    /// Returns the replacement session id when the backend issued one; the
    /// caller persists it and restarts the dwell ticker.
    pub fn generation_succeeded(&mut self, card: GeneratedCard) -> Option<String> {
        let replacement = card.session_id.clone();
        tracing::info!(card_id = %card.card_id, "scent card generated");
        self.card = Some(card);

        match &replacement {
            Some(new_id) => self.begin_session(new_id.clone()),
            None => {
                if let Some(session) = self.session.as_mut() {
                    session.interaction_count = 0;
                    session.card_trigger_ready = false;
                    session.last_trigger_message = None;
                }
            }
        }
        self.phase = ScorerPhase::PostGenerate;
        replacement
    }

    /// Record a save failure without touching the session
    pub fn save_failed(&mut self, error: impl Into<String>) {
        let error = error.into();
        tracing::warn!(%error, "card save failed");
        self.last_error = Some(error);
    }

    /// The card was saved; move to the session the backend issued, if any
    pub fn card_saved(&mut self, new_session_id: Option<String>) -> Option<String> {
        self.last_error = None;
        let new_id = new_session_id.filter(|s| !s.is_empty())?;
        self.begin_session(new_id.clone());
        self.phase = ScorerPhase::PostGenerate;
        Some(new_id)
    }

    pub fn snapshot(&self) -> ScorerSnapshot {
        let session = self.session.as_ref();
        ScorerSnapshot {
            phase: self.phase,
            session_id: session.map(|s| s.session_id.clone()),
            dwell_time_seconds: session.map_or(0, |s| s.dwell_time_seconds),
            interaction_count: session.map_or(0, |s| s.interaction_count),
            card_trigger_ready: session.is_some_and(|s| s.card_trigger_ready),
            prompt_visible: self.prompt_visible,
            trigger_message: session.and_then(|s| s.last_trigger_message.clone()),
            daily_limit_reached: self.daily_limit_reached,
            daily_limit_remaining: self.daily_limit_remaining,
            last_error: self.last_error.clone(),
            card: self.card.clone(),
        }
    }
}
