//! Transcript storage
//!
//! Stores conversation turns in insertion order. Turns are never reordered
//! or mutated after creation.

use crate::models::{ConversationTurn, TurnRole};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Append-only transcript for one conversation session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append one turn. There is no removal or mutation API.
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Prior turns rendered for LLM framing (most recent `count`).
    pub fn recent_context(&self, count: usize) -> String {
        let start = self.turns.len().saturating_sub(count);
        let mut context = String::new();

        for turn in &self.turns[start..] {
            let role = match turn.role {
                TurnRole::User => "User",
                TurnRole::Assistant => "Assistant",
            };
            context.push_str(&format!("{}: {}\n", role, turn.content));
        }

        context
    }
}

/// In-memory session store keyed by session id.
///
/// The only mutable shared structure in the agent; appended to one question
/// at a time under the single-threaded-per-session model. Nothing persists
/// beyond the process.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Transcript>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot of the transcript for `session_id` (empty if new).
    pub async fn transcript(&self, session_id: Uuid) -> Transcript {
        let sessions = self.sessions.read().await;
        sessions.get(&session_id).cloned().unwrap_or_default()
    }

    /// Append one turn to the session's transcript.
    pub async fn append(&self, session_id: Uuid, turn: ConversationTurn) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id).or_default().push(turn);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
