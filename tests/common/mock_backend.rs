//! In-process stand-in for the scentmap HTTP backend
//!
//! Records every call so tests can assert on order and content, and lets
//! each test decide when cards become ready and which calls fail.

use async_trait::async_trait;
use scentmap::client::{ClientError, ClientResult, NetworkQuery, NetworkSource, SessionBackend};
use scentmap::session::{
    ActivityRequest, ActivityResponse, GenerateCardResponse, SaveCardRequest, SaveCardResponse,
    StartSessionRequest, StartSessionResponse, UpdateContextRequest,
};
use scentmap::{FilterOptions, Labels, NetworkPayload};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

pub struct MockBackend {
    /// Activity logs in arrival order
    pub activity: Mutex<Vec<(String, ActivityRequest)>>,
    pub contexts: Mutex<Vec<(String, UpdateContextRequest)>>,
    pub generated_for: Mutex<Vec<String>>,
    pub saved: Mutex<Vec<(String, i64, String)>>,
    pub sessions_started: AtomicUsize,
    /// Interaction count at which the backend reports readiness (0: never)
    ready_after: AtomicU64,
    fail_activity: AtomicBool,
    fail_generation: AtomicBool,
    rotate_on_generate: AtomicBool,
    accept_save: AtomicBool,
    fail_network: AtomicBool,
    fail_vocabularies: AtomicBool,
    next_card: AtomicU64,
    log_delay: Mutex<Duration>,
    network: Mutex<Option<NetworkPayload>>,
    fetch_delays: Mutex<HashMap<Option<i64>, Duration>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            activity: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
            generated_for: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            sessions_started: AtomicUsize::new(0),
            ready_after: AtomicU64::new(0),
            fail_activity: AtomicBool::new(false),
            fail_generation: AtomicBool::new(false),
            rotate_on_generate: AtomicBool::new(true),
            accept_save: AtomicBool::new(true),
            fail_network: AtomicBool::new(false),
            fail_vocabularies: AtomicBool::new(false),
            next_card: AtomicU64::new(1),
            log_delay: Mutex::new(Duration::ZERO),
            network: Mutex::new(None),
            fetch_delays: Mutex::new(HashMap::new()),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ready_after(self, interactions: u64) -> Self {
        self.ready_after.store(interactions, Ordering::SeqCst);
        self
    }

    pub fn with_log_delay(self, delay: Duration) -> Self {
        *self.log_delay.lock().unwrap() = delay;
        self
    }

    pub fn with_network(self, payload: NetworkPayload) -> Self {
        *self.network.lock().unwrap() = Some(payload);
        self
    }

    /// Delay `fetch_network` for queries with this member id
    pub fn with_fetch_delay(self, member_id: Option<i64>, delay: Duration) -> Self {
        self.fetch_delays.lock().unwrap().insert(member_id, delay);
        self
    }

    pub fn keep_session_on_generate(self) -> Self {
        self.rotate_on_generate.store(false, Ordering::SeqCst);
        self
    }

    /// Reject activity logs; rejected logs are not recorded
    pub fn set_fail_activity(&self, fail: bool) {
        self.fail_activity.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_generation(&self, fail: bool) {
        self.fail_generation.store(fail, Ordering::SeqCst);
    }

    pub fn set_accept_save(&self, accept: bool) {
        self.accept_save.store(accept, Ordering::SeqCst);
    }

    pub fn set_fail_network(&self, fail: bool) {
        self.fail_network.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_vocabularies(&self, fail: bool) {
        self.fail_vocabularies.store(fail, Ordering::SeqCst);
    }

    /// Interaction counts of the recorded activity logs, in arrival order
    pub fn logged_counts(&self) -> Vec<u64> {
        self.activity
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.interaction_count)
            .collect()
    }

    fn server_error(detail: &str) -> ClientError {
        ClientError::Status {
            status: 500,
            detail: detail.to_string(),
        }
    }
}

#[async_trait]
impl SessionBackend for MockBackend {
    async fn start_session(&self, _request: &StartSessionRequest) -> ClientResult<StartSessionResponse> {
        self.sessions_started.fetch_add(1, Ordering::SeqCst);
        Ok(StartSessionResponse {
            session_id: Uuid::new_v4().to_string(),
        })
    }

    async fn log_activity(
        &self,
        session_id: &str,
        request: &ActivityRequest,
    ) -> ClientResult<ActivityResponse> {
        let delay = *self.log_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(Self::server_error("activity store unavailable"));
        }
        self.activity
            .lock()
            .unwrap()
            .push((session_id.to_string(), request.clone()));

        let threshold = self.ready_after.load(Ordering::SeqCst);
        let ready = threshold > 0 && request.interaction_count >= threshold;
        Ok(ActivityResponse {
            logged: true,
            card_trigger_ready: ready,
            trigger_message: ready.then(|| "Your scent card is ready".to_string()),
            daily_limit_reached: Some(false),
            daily_limit_remaining: Some(3),
        })
    }

    async fn update_context(&self, session_id: &str, request: &UpdateContextRequest) -> ClientResult<()> {
        self.contexts
            .lock()
            .unwrap()
            .push((session_id.to_string(), request.clone()));
        Ok(())
    }

    async fn generate_card(&self, session_id: &str) -> ClientResult<GenerateCardResponse> {
        self.generated_for.lock().unwrap().push(session_id.to_string());
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(Self::server_error("generation failed"));
        }
        let card_id = format!("card-{}", self.next_card.fetch_add(1, Ordering::SeqCst));
        let session_id = self
            .rotate_on_generate
            .load(Ordering::SeqCst)
            .then(|| Uuid::new_v4().to_string());
        Ok(GenerateCardResponse {
            card: Some(json!({"title": "Quiet Cedar", "card_id": card_id})),
            card_id: Some(card_id),
            session_id,
            generation_method: Some("llm".to_string()),
            generation_time_ms: Some(12),
        })
    }

    async fn save_card(
        &self,
        session_id: &str,
        member_id: i64,
        request: &SaveCardRequest,
    ) -> ClientResult<SaveCardResponse> {
        self.saved
            .lock()
            .unwrap()
            .push((session_id.to_string(), member_id, request.card_id.clone()));
        if !self.accept_save.load(Ordering::SeqCst) {
            return Ok(SaveCardResponse {
                success: false,
                message: "card already saved".to_string(),
                ..Default::default()
            });
        }
        Ok(SaveCardResponse {
            success: true,
            message: "saved".to_string(),
            card_id: Some(request.card_id.clone()),
            new_session_id: Some(Uuid::new_v4().to_string()),
        })
    }
}

#[async_trait]
impl NetworkSource for MockBackend {
    async fn fetch_network(&self, query: &NetworkQuery) -> ClientResult<NetworkPayload> {
        let delay = self
            .fetch_delays
            .lock()
            .unwrap()
            .get(&query.member_id)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_network.load(Ordering::SeqCst) {
            return Err(Self::server_error("network build failed"));
        }
        let mut payload = self
            .network
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::InvalidResponse("no network configured".to_string()))?;
        payload.meta = json!({ "member_id": query.member_id });
        Ok(payload)
    }

    async fn fetch_labels(&self) -> ClientResult<Labels> {
        if self.fail_vocabularies.load(Ordering::SeqCst) {
            return Err(Self::server_error("labels unavailable"));
        }
        let mut labels = Labels::default();
        labels.accords.insert("Woody".to_string(), "우디".to_string());
        Ok(labels)
    }

    async fn fetch_filter_options(&self) -> ClientResult<FilterOptions> {
        if self.fail_vocabularies.load(Ordering::SeqCst) {
            return Err(Self::server_error("filter options unavailable"));
        }
        Ok(FilterOptions {
            accords: vec!["Citrus".to_string(), "Woody".to_string()],
            ..Default::default()
        })
    }
}
