//! Route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use support_bot::{ConversationTurn, Session};

use crate::error::ApiError;
use crate::state::{AppState, BotState};

/// Longest accepted question, in characters.
const MAX_QUERY_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub session_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query_id: Uuid,
    pub session_id: Uuid,
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
}

/// `POST /api/v1/query`
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let start = Instant::now();

    let chars = req.query.chars().count();
    if chars == 0 {
        return Err(ApiError::bad_request("query must not be empty"));
    }
    if chars > MAX_QUERY_CHARS {
        return Err(ApiError::bad_request(format!(
            "query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }

    let bot = match &state.bot {
        BotState::Ready(bot) => bot.clone(),
        BotState::Failed(reason) => {
            return Err(ApiError::service_unavailable(format!(
                "chatbot unavailable: {}",
                reason
            )));
        }
    };

    let session = match req.session_id {
        Some(id) => state
            .sessions
            .get(id)
            .ok_or_else(|| ApiError::bad_request(format!("unknown session: {}", id)))?,
        None => state.sessions.create(req.user_id.clone()),
    };

    if let Some(metadata) = &req.metadata {
        debug!(session_id = %session.id, %metadata, "Query metadata");
    }

    let response = bot.answer(&req.query, &session.turns).await;
    let recorded = state.sessions.record_turn(
        session.id,
        ConversationTurn::new(req.query.clone(), response.clone()),
    );
    if !recorded {
        warn!(session_id = %session.id, "Session expired mid-query, turn not recorded");
    }

    let processing_time_ms = start.elapsed().as_millis() as u64;
    info!(session_id = %session.id, processing_time_ms, "Query answered");

    Ok(Json(QueryResponse {
        query_id: Uuid::new_v4(),
        session_id: session.id,
        query: req.query,
        response,
        timestamp: Utc::now(),
        processing_time_ms,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = match &state.bot {
        BotState::Ready(_) => "ok",
        BotState::Failed(_) => "degraded",
    };

    Json(HealthResponse {
        status,
        service: "support-rag",
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// `POST /api/v1/session`
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateSessionRequest>>,
) -> Json<CreateSessionResponse> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let session = state.sessions.create(req.user_id);

    Json(CreateSessionResponse {
        session_id: session.id,
        created_at: session.created_at,
    })
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub turns: Vec<ConversationTurn>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            user_id: session.user_id,
            created_at: session.created_at,
            last_active: session.last_active,
            turns: session.turns,
        }
    }
}

/// `GET /api/v1/session/{id}`
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .sessions
        .get(id)
        .ok_or_else(|| ApiError::not_found(format!("unknown session: {}", id)))?;

    Ok(Json(session.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use axum::http::StatusCode;
    use support_bot::Chatbot;
    use support_core::BotConfig;
    use support_embed::MockEmbedder;
    use support_llm::StaticCompletion;
    use support_store::MemoryStore;

    async fn ready_state() -> (Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "Transfers between accounts are free of charge.").unwrap();

        let mut config = BotConfig::default();
        config.knowledge_base = path;
        config.chunking.min_tokens = 1;

        let bot = Chatbot::build(
            &config,
            Arc::new(MemoryStore::new()),
            Arc::new(MockEmbedder::new()),
            Arc::new(StaticCompletion::new("Transfers are free.")),
        )
        .await
        .unwrap();

        (
            Arc::new(AppState::new(BotState::Ready(Arc::new(bot)))),
            dir,
        )
    }

    fn failed_state() -> Arc<AppState> {
        Arc::new(AppState::new(BotState::Failed(
            "knowledge base missing".to_string(),
        )))
    }

    fn request(query: &str) -> QueryRequest {
        QueryRequest {
            query: query.to_string(),
            session_id: None,
            user_id: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_query_answers_and_opens_session() {
        let (state, _dir) = ready_state().await;

        let Json(res) = query(State(state.clone()), Json(request("What are the fees?")))
            .await
            .unwrap();

        assert_eq!(res.response, "Transfers are free.");
        assert_eq!(res.query, "What are the fees?");

        // The turn was recorded under the returned session.
        let session = state.sessions.get(res.session_id).unwrap();
        assert_eq!(session.turns.len(), 1);
        assert_eq!(session.turns[0].response, "Transfers are free.");
    }

    #[tokio::test]
    async fn test_query_continues_existing_session() {
        let (state, _dir) = ready_state().await;
        let session = state.sessions.create(None);

        let mut req = request("What are the fees?");
        req.session_id = Some(session.id);
        let Json(res) = query(State(state.clone()), Json(req)).await.unwrap();

        assert_eq!(res.session_id, session.id);
        assert_eq!(state.sessions.get(session.id).unwrap().turns.len(), 1);
    }

    #[tokio::test]
    async fn test_query_rejects_empty() {
        let (state, _dir) = ready_state().await;
        let err = query(State(state), Json(request(""))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_rejects_overlong() {
        let (state, _dir) = ready_state().await;
        let long = "x".repeat(MAX_QUERY_CHARS + 1);
        let err = query(State(state), Json(request(&long))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_rejects_unknown_session() {
        let (state, _dir) = ready_state().await;
        let mut req = request("What are the fees?");
        req.session_id = Some(Uuid::new_v4());

        let err = query(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_unavailable_when_bot_failed() {
        let err = query(State(failed_state()), Json(request("anything")))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_reports_bot_state() {
        let (state, _dir) = ready_state().await;
        let Json(res) = health(State(state)).await;
        assert_eq!(res.status, "ok");

        let Json(res) = health(State(failed_state())).await;
        assert_eq!(res.status, "degraded");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (state, _dir) = ready_state().await;

        let Json(created) = create_session(
            State(state.clone()),
            Some(Json(CreateSessionRequest {
                user_id: Some("user-1".to_string()),
            })),
        )
        .await;

        let Json(fetched) = get_session(State(state), Path(created.session_id))
            .await
            .unwrap();
        assert_eq!(fetched.session_id, created.session_id);
        assert_eq!(fetched.user_id.as_deref(), Some("user-1"));
        assert!(fetched.turns.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_session_is_404() {
        let (state, _dir) = ready_state().await;
        let err = get_session(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
