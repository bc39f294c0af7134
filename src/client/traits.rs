//! Backend client traits

use crate::config::ApiConfig;
use crate::graph::NetworkPayload;
use crate::labels::{FilterOptions, Labels};
use crate::session::{
    ActivityRequest, ActivityResponse, GenerateCardResponse, SaveCardRequest, SaveCardResponse,
    StartSessionRequest, StartSessionResponse, UpdateContextRequest,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Serialization error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for backend calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Query for `GET /nmap/perfumes`
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkQuery {
    pub min_similarity: f64,
    pub top_accords: usize,
    pub max_perfumes: usize,
    pub member_id: Option<i64>,
}

impl NetworkQuery {
    /// The full dataset: every edge, up to five accords per perfume
    ///
    /// Thresholds are applied client-side by the render pipeline, so the
    /// fetch itself is unfiltered.
    pub fn full(config: &ApiConfig, member_id: Option<i64>) -> Self {
        Self {
            min_similarity: 0.0,
            top_accords: 5,
            max_perfumes: config.max_perfumes,
            member_id,
        }
    }

    /// Dependency key; a fetch with a different key supersedes this one
    pub fn key(&self) -> String {
        format!(
            "min={}&top={}&max={}&member={}",
            self.min_similarity,
            self.top_accords,
            self.max_perfumes,
            self.member_id.map(|m| m.to_string()).unwrap_or_default()
        )
    }

    /// Query-string pairs, `member_id` only when known
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("min_similarity", self.min_similarity.to_string()),
            ("top_accords", self.top_accords.to_string()),
            ("max_perfumes", self.max_perfumes.to_string()),
        ];
        if let Some(member) = self.member_id {
            params.push(("member_id", member.to_string()));
        }
        params
    }
}

/// Where datasets and vocabularies come from
#[async_trait]
pub trait NetworkSource: Send + Sync {
    async fn fetch_network(&self, query: &NetworkQuery) -> ClientResult<NetworkPayload>;

    async fn fetch_labels(&self) -> ClientResult<Labels>;

    async fn fetch_filter_options(&self) -> ClientResult<FilterOptions>;
}

/// The activity scorer's backend
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn start_session(&self, request: &StartSessionRequest) -> ClientResult<StartSessionResponse>;

    async fn log_activity(
        &self,
        session_id: &str,
        request: &ActivityRequest,
    ) -> ClientResult<ActivityResponse>;

    async fn update_context(&self, session_id: &str, request: &UpdateContextRequest) -> ClientResult<()>;

    async fn generate_card(&self, session_id: &str) -> ClientResult<GenerateCardResponse>;

    async fn save_card(
        &self,
        session_id: &str,
        member_id: i64,
        request: &SaveCardRequest,
    ) -> ClientResult<SaveCardResponse>;
}
