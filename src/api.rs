//! REST API Server for the Financial Analyst Agent
//!
//! Exposes the agent via HTTP endpoints
//! Integrates with frontend chat UIs

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::agent::Orchestrator;
use crate::memory::SessionStore;
use crate::models::ConversationTurn;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
    pub sessions: Arc<SessionStore>,
}

/// =============================
/// Helpers — Stable Session Ids
/// =============================

fn stable_uuid_from_string(input: &str) -> uuid::Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    uuid::Uuid::from_bytes(bytes)
}

fn session_id_for(chat_id: Option<&str>) -> uuid::Uuid {
    match chat_id {
        Some(value) if !value.trim().is_empty() => {
            uuid::Uuid::parse_str(value).unwrap_or_else(|_| stable_uuid_from_string(value))
        }
        _ => stable_uuid_from_string("anonymous-session"),
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("No question provided".into())),
        );
    }

    let session_id = session_id_for(req.chat_id.as_deref());
    info!(%session_id, "Received chat request");

    // Prior turns are read only for conversational framing; the current
    // question is the sole workflow input.
    let transcript = state.sessions.transcript(session_id).await;

    let answer = state.orchestrator.answer(&question, &transcript).await;

    // Exactly one user turn and one assistant turn appended per request.
    state
        .sessions
        .append(session_id, ConversationTurn::user(question))
        .await;
    state
        .sessions
        .append(session_id, ConversationTurn::assistant(answer.clone()))
        .await;

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "answer": answer,
            "chat_id": session_id.to_string(),
        }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = ApiState {
        orchestrator,
        sessions: Arc::new(SessionStore::new()),
    };

    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    orchestrator: Arc<Orchestrator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_uuid_is_deterministic() {
        let a = stable_uuid_from_string("chat-42");
        let b = stable_uuid_from_string("chat-42");
        let c = stable_uuid_from_string("chat-43");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn test_session_id_prefers_parseable_uuid() {
        let raw = uuid::Uuid::new_v4();
        assert_eq!(session_id_for(Some(&raw.to_string())), raw);

        // Non-UUID chat ids map to a stable derived id.
        assert_eq!(
            session_id_for(Some("my-chat")),
            stable_uuid_from_string("my-chat")
        );

        // Absent ids share the anonymous session.
        assert_eq!(session_id_for(None), session_id_for(Some("  ")));
    }
}
