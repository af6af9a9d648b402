use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::messages::{
    ChatRequest, ChatResponse, CreateSessionRequest, CreateSessionResponse, KnowledgeAnswer,
    KnowledgeQuery, Scorecard, SessionArtifactRequest, SessionId, Summary,
};
use crate::config::EndpointsConfig;
use crate::error::{CoachError, Result};
use crate::session::Mood;

/// Backend operations the coaching session depends on.
///
/// No retries and no timeouts beyond the transport default; resilience
/// policy belongs to the caller.
#[async_trait]
pub trait CoachingApi: Send + Sync {
    /// Open a live session and return its identifier
    async fn create_session(&self, linkedin_url: &str, mood: Mood) -> Result<SessionId>;

    /// Send one user utterance, returning the coach reply (may be empty)
    async fn send_chat(&self, session_id: &SessionId, message: &str) -> Result<String>;

    async fn fetch_scorecard(&self, session_id: &SessionId) -> Result<Scorecard>;

    async fn fetch_summary(&self, session_id: &SessionId) -> Result<Summary>;

    /// Knowledge-base lookup keyed on free text
    async fn query_knowledge(&self, query: &str) -> Result<KnowledgeAnswer>;
}

/// [`CoachingApi`] over plain HTTP + JSON
pub struct HttpCoachingApi {
    client: Client,
    endpoints: EndpointsConfig,
}

impl HttpCoachingApi {
    pub fn new(endpoints: EndpointsConfig) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(client: Client, endpoints: EndpointsConfig) -> Self {
        Self { client, endpoints }
    }

    fn live_url(&self, path: &str) -> Result<String> {
        Ok(format!("{}/{}", self.endpoints.live_base()?, path))
    }

    async fn post_json<B, R>(&self, operation: &'static str, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        debug!("POST {} ({})", url, operation);

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| CoachError::network(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = if text.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                text
            };
            return Err(CoachError::Http {
                operation,
                status,
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CoachError::malformed(operation, e.to_string()))
    }
}

#[async_trait]
impl CoachingApi for HttpCoachingApi {
    async fn create_session(&self, linkedin_url: &str, mood: Mood) -> Result<SessionId> {
        let url = self.live_url("sessions")?;
        info!("Creating session with mood: {}", mood);

        let response: CreateSessionResponse = self
            .post_json(
                "Live",
                &url,
                &CreateSessionRequest {
                    linkedin_url: linkedin_url.to_string(),
                    mood,
                },
            )
            .await?;

        let session_id = response
            .session_id
            .map(SessionId::new)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CoachError::malformed("Live", "No session ID returned from API"))?;

        info!("Session created successfully: {}", session_id);
        Ok(session_id)
    }

    async fn send_chat(&self, session_id: &SessionId, message: &str) -> Result<String> {
        let url = self.live_url("chat")?;
        debug!("Sending chat with session ID: {}", session_id);

        let response: ChatResponse = self
            .post_json(
                "Chat",
                &url,
                &ChatRequest {
                    session_id: session_id.clone(),
                    message: message.to_string(),
                },
            )
            .await?;

        Ok(response.reply.unwrap_or_default())
    }

    async fn fetch_scorecard(&self, session_id: &SessionId) -> Result<Scorecard> {
        let url = self.live_url("scores")?;
        info!("Fetching scores for session: {}", session_id);

        self.post_json(
            "Scores",
            &url,
            &SessionArtifactRequest {
                session_id: session_id.clone(),
            },
        )
        .await
    }

    async fn fetch_summary(&self, session_id: &SessionId) -> Result<Summary> {
        let url = self.live_url("summary")?;
        info!("Fetching summary for session: {}", session_id);

        self.post_json(
            "Summary",
            &url,
            &SessionArtifactRequest {
                session_id: session_id.clone(),
            },
        )
        .await
    }

    async fn query_knowledge(&self, query: &str) -> Result<KnowledgeAnswer> {
        let url = self.endpoints.rag_api()?.to_string();

        self.post_json(
            "RAG",
            &url,
            &KnowledgeQuery {
                query: query.to_string(),
            },
        )
        .await
    }
}
