//! Request tokens for supersedable fetches
//!
//! Each dataset fetch carries a token keyed by the inputs it depends on.
//! Starting a newer fetch cancels the older token; a response is committed
//! only if its token is still the current one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// A cancellable handle for one in-flight request
///
/// Cloned tokens share state. Cancellation is sticky.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    key: String,
    cancelled: Arc<watch::Sender<bool>>,
}

impl RequestToken {
    pub fn new(id: u64, key: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            id,
            key: key.into(),
            cancelled: Arc::new(tx),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Dependency snapshot this request was issued for
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // the sender lives in `self`, so this only ends on cancellation
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Hands out request tokens and tracks which one is current
#[derive(Debug, Default)]
pub struct FetchCoordinator {
    next_id: AtomicU64,
    current: Mutex<Option<RequestToken>>,
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, cancelling whatever was in flight
    pub fn begin(&self, key: impl Into<String>) -> RequestToken {
        let token = RequestToken::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1, key);
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(token.clone()) {
            tracing::debug!(id = previous.id, key = previous.key(), "superseding fetch");
            previous.cancel();
        }
        token
    }

    /// Whether `token` is the latest request and was not cancelled
    pub fn is_current(&self, token: &RequestToken) -> bool {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        !token.is_cancelled() && current.as_ref().is_some_and(|c| c.id == token.id)
    }

    /// Mark `token` done; a newer request is left alone
    pub fn finish(&self, token: &RequestToken) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.as_ref().is_some_and(|c| c.id == token.id) {
            *current = None;
        }
    }
}
