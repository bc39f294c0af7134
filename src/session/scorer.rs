//! Async driver for the activity scorer

use super::state::{Interaction, ScorerCore, ScorerSnapshot, SessionError, SessionResult};
use super::types::{
    ActivityRequest, GeneratedCard, GenerationContext, SaveCardRequest, SaveCardResponse,
    StartSessionRequest, UpdateContextRequest,
};
use crate::client::SessionBackend;
use crate::config::SessionConfig;
use crate::storage::{SessionStorage, SESSION_ID_KEY};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Who is exploring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerOptions {
    pub member_id: Option<i64>,
    pub mbti: String,
}

impl ScorerOptions {
    pub fn from_config(config: &SessionConfig, member_id: Option<i64>) -> Self {
        Self {
            member_id,
            mbti: config.mbti.clone(),
        }
    }
}

impl Default for ScorerOptions {
    fn default() -> Self {
        Self {
            member_id: None,
            mbti: "INFJ".to_string(),
        }
    }
}

enum Job {
    Log {
        session_id: String,
        request: ActivityRequest,
    },
    Flush(oneshot::Sender<()>),
}

type SharedCore = Arc<Mutex<ScorerCore>>;

fn lock(core: &Mutex<ScorerCore>) -> MutexGuard<'_, ScorerCore> {
    core.lock().unwrap_or_else(|e| e.into_inner())
}

/// Sends activity logs one at a time, in the order they were recorded
async fn dispatch(core: SharedCore, backend: Arc<dyn SessionBackend>, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Log { session_id, request } => {
                match backend.log_activity(&session_id, &request).await {
                    Ok(response) => {
                        lock(&core).apply_activity(&session_id, &response);
                    }
                    Err(e) => tracing::warn!(
                        error = %e,
                        session_id,
                        interaction_count = request.interaction_count,
                        "activity log failed"
                    ),
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Puts an abandoned generation back into a retryable phase
///
/// Armed while `generate` awaits the backend. Dropping it armed (the caller
/// gave up on the future) records a cancellation failure.
struct GenerationGuard<'a> {
    core: &'a Mutex<ScorerCore>,
    armed: bool,
}

impl<'a> GenerationGuard<'a> {
    fn new(core: &'a Mutex<ScorerCore>) -> Self {
        Self { core, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.core).generation_failed("card generation cancelled");
        }
    }
}

/// Adds one dwell second per second until the session is replaced
fn spawn_ticker(core: SharedCore, session_id: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if !lock(&core).tick(&session_id) {
                break;
            }
        }
    })
}

/// The session activity scorer
///
/// Interactions are counted synchronously and logged in the background by a
/// single dispatcher task, so logs reach the backend in interaction order.
/// Must be created inside a tokio runtime.
pub struct SessionScorer {
    core: SharedCore,
    backend: Arc<dyn SessionBackend>,
    storage: Arc<dyn SessionStorage>,
    options: ScorerOptions,
    jobs: mpsc::UnboundedSender<Job>,
    dispatcher: JoinHandle<()>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionScorer {
    /// Resume the persisted session, or start a new one with the backend
    pub async fn start(
        backend: Arc<dyn SessionBackend>,
        storage: Arc<dyn SessionStorage>,
        options: ScorerOptions,
    ) -> SessionResult<Self> {
        let session_id = match storage.get(SESSION_ID_KEY)?.filter(|s| !s.is_empty()) {
            Some(stored) => {
                tracing::info!(session_id = %stored, "reusing stored session");
                stored
            }
            None => {
                let request = StartSessionRequest {
                    member_id: options.member_id,
                    mbti: Some(options.mbti.clone()),
                };
                let started = backend.start_session(&request).await?;
                storage.set(SESSION_ID_KEY, &started.session_id)?;
                started.session_id
            }
        };

        let core: SharedCore = Arc::new(Mutex::new(ScorerCore::new()));
        lock(&core).begin_session(session_id.clone());

        let (jobs, rx) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(dispatch(core.clone(), backend.clone(), rx));
        let ticker = spawn_ticker(core.clone(), session_id);

        Ok(Self {
            core,
            backend,
            storage,
            options,
            jobs,
            dispatcher,
            ticker: Mutex::new(Some(ticker)),
        })
    }

    pub fn member_id(&self) -> Option<i64> {
        self.options.member_id
    }

    /// Count one interaction and queue its activity log
    ///
    /// Returns the new interaction count, or `None` when there is no session.
    pub fn record<I, S>(&self, interaction: Interaction, selected_accords: I) -> Option<u64>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selected: Vec<String> = selected_accords.into_iter().map(Into::into).collect();
        let Some((session_id, request)) = lock(&self.core).record(&interaction, selected) else {
            tracing::debug!(?interaction, "interaction before session start, not logged");
            return None;
        };
        let count = request.interaction_count;
        if self.jobs.send(Job::Log { session_id, request }).is_err() {
            tracing::warn!("activity dispatcher stopped, log dropped");
        }
        Some(count)
    }

    /// Wait until every queued activity log has been answered
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.jobs.send(Job::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    pub fn dismiss_prompt(&self) {
        lock(&self.core).dismiss_prompt();
    }

    pub fn snapshot(&self) -> ScorerSnapshot {
        lock(&self.core).snapshot()
    }

    /// Generate the scent card for the current session
    ///
    /// The generation context is sent first, best effort. On success the
    /// backend usually moves us to a fresh session. Dropping the returned
    /// future leaves the scorer ready to retry.
    pub async fn generate(&self, context: GenerationContext) -> SessionResult<GeneratedCard> {
        let session_id = lock(&self.core).begin_generation()?;
        let mut guard = GenerationGuard::new(&self.core);
        self.flush().await;

        let update = UpdateContextRequest::new(
            self.options.member_id,
            Some(self.options.mbti.clone()),
            context,
        );
        if let Err(e) = self.backend.update_context(&session_id, &update).await {
            tracing::warn!(error = %e, session_id, "context update failed, generating anyway");
        }

        let outcome = match self.backend.generate_card(&session_id).await {
            Ok(response) => response.into_card(),
            Err(e) => Err(e.to_string()),
        };
        guard.disarm();
        let card = match outcome {
            Ok(card) => card,
            Err(message) => {
                lock(&self.core).generation_failed(message.clone());
                return Err(SessionError::Generation(message));
            }
        };

        let replacement = lock(&self.core).generation_succeeded(card.clone());
        if let Some(new_id) = replacement {
            self.adopt_session(new_id);
        }
        Ok(card)
    }

    /// Save the generated card to the member's collection
    pub async fn save_card(&self) -> SessionResult<SaveCardResponse> {
        let member_id = self.options.member_id.ok_or(SessionError::NotAuthenticated)?;
        let (session_id, card_id) = {
            let core = lock(&self.core);
            let card = core.card().ok_or(SessionError::NoCard)?;
            let session_id = core.session_id().ok_or(SessionError::NoSession)?;
            (session_id.to_string(), card.card_id.clone())
        };

        let request = SaveCardRequest { card_id };
        let response = match self.backend.save_card(&session_id, member_id, &request).await {
            Ok(response) if response.success => response,
            Ok(response) => {
                let message = if response.message.is_empty() {
                    "backend did not accept the card".to_string()
                } else {
                    response.message
                };
                lock(&self.core).save_failed(message.clone());
                return Err(SessionError::Save(message));
            }
            Err(e) => {
                lock(&self.core).save_failed(e.to_string());
                return Err(SessionError::Save(e.to_string()));
            }
        };

        let replacement = lock(&self.core).card_saved(response.new_session_id.clone());
        if let Some(new_id) = replacement {
            self.adopt_session(new_id);
        }
        Ok(response)
    }

    /// Persist a replacement session id and restart the dwell ticker for it
    fn adopt_session(&self, session_id: String) {
        if let Err(e) = self.storage.set(SESSION_ID_KEY, &session_id) {
            tracing::warn!(error = %e, "could not persist session id");
        }
        let fresh = spawn_ticker(self.core.clone(), session_id);
        let mut ticker = self.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = ticker.replace(fresh) {
            old.abort();
        }
    }

    /// Stop the ticker and the dispatcher; queued logs are dropped
    pub fn shutdown(&self) {
        if let Some(ticker) = self.ticker.lock().unwrap_or_else(|e| e.into_inner()).take() {
            ticker.abort();
        }
        self.dispatcher.abort();
    }
}

impl Drop for SessionScorer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
