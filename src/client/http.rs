//! reqwest implementation of the backend traits

use super::traits::{ClientError, ClientResult, NetworkQuery, NetworkSource, SessionBackend};
use crate::graph::NetworkPayload;
use crate::labels::{FilterOptions, Labels};
use crate::session::{
    ActivityRequest, ActivityResponse, GenerateCardResponse, SaveCardRequest, SaveCardResponse,
    StartSessionRequest, StartSessionResponse, UpdateContextRequest,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the scentmap backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Pull a readable message out of an error body; FastAPI puts it in `detail`
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        detail: error_detail(&body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = check(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl NetworkSource for HttpBackend {
    async fn fetch_network(&self, query: &NetworkQuery) -> ClientResult<NetworkPayload> {
        tracing::debug!(key = %query.key(), "fetching network");
        let response = self
            .client
            .get(self.url("/nmap/perfumes"))
            .query(&query.params())
            .send()
            .await?;
        decode(response).await
    }

    async fn fetch_labels(&self) -> ClientResult<Labels> {
        let response = self.client.get(self.url("/labels")).send().await?;
        decode(response).await
    }

    async fn fetch_filter_options(&self) -> ClientResult<FilterOptions> {
        let response = self.client.get(self.url("/nmap/filter-options")).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl SessionBackend for HttpBackend {
    async fn start_session(&self, request: &StartSessionRequest) -> ClientResult<StartSessionResponse> {
        let response = self
            .client
            .post(self.url("/session/start"))
            .json(request)
            .send()
            .await?;
        let started: StartSessionResponse = decode(response).await?;
        if started.session_id.is_empty() {
            return Err(ClientError::InvalidResponse("empty session id".into()));
        }
        Ok(started)
    }

    async fn log_activity(
        &self,
        session_id: &str,
        request: &ActivityRequest,
    ) -> ClientResult<ActivityResponse> {
        let response = self
            .client
            .post(self.url(&format!("/session/{}/activity", session_id)))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_context(&self, session_id: &str, request: &UpdateContextRequest) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/session/{}/update-context", session_id)))
            .json(request)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn generate_card(&self, session_id: &str) -> ClientResult<GenerateCardResponse> {
        let response = self
            .client
            .post(self.url(&format!("/session/{}/generate-card", session_id)))
            .query(&[("use_template", "false")])
            .send()
            .await?;
        decode(response).await
    }

    async fn save_card(
        &self,
        session_id: &str,
        member_id: i64,
        request: &SaveCardRequest,
    ) -> ClientResult<SaveCardResponse> {
        let response = self
            .client
            .post(self.url(&format!("/session/{}/save-card", session_id)))
            .query(&[("member_id", member_id)])
            .json(request)
            .send()
            .await?;
        decode(response).await
    }
}
