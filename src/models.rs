//! Core data models for the financial analyst agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Quote =================
//

/// Latest trading snapshot for a ticker.
///
/// Constructed fresh on every fetch, serialized into the capability result
/// string and discarded — never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub ticker: String,
    pub current_price: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
}

//
// ================= Sentiment =================
//

/// Closed label set the sentiment instruction template asks for.
///
/// The classifier output itself is passed through unparsed; this enum exists
/// for the prompt template and for tests, not for validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

//
// ================= Conversation =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One role-tagged message in the session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }
}

//
// ================= Workflow =================
//

/// A capability result gathered while answering one question.
///
/// `output` carries the capability's textual result whether it is success- or
/// failure-tagged; the workflow never drops a failed step. Not persisted
/// across questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityObservation {
    pub capability: String,
    pub input: String,
    pub output: String,
}

/// What the planner sees of a registered capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitySpec {
    pub name: String,
    pub description: String,
}

/// The planner's decision for the next step of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    Invoke { capability: String, input: String },
    Finish { answer: String },
}

/// Per-question progression through the fixed workflow.
///
/// Any phase may jump straight to `Answered` carrying a degraded answer;
/// there is no failed terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    NewsRequested,
    SentimentRequested,
    QuoteRequested,
    Synthesizing,
    Answered,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_snapshot_serializes_all_fields() {
        let quote = QuoteSnapshot {
            ticker: "NVDA".to_string(),
            current_price: 905.12,
            day_high: 912.0,
            day_low: 889.5,
            volume: 41_230_000,
        };

        let json = serde_json::to_string(&quote).unwrap();
        for field in ["ticker", "current_price", "day_high", "day_low", "volume"] {
            assert!(json.contains(field), "missing field {}", field);
        }
        assert!(json.contains("NVDA"));
    }

    #[test]
    fn test_sentiment_labels_display() {
        assert_eq!(SentimentLabel::Positive.to_string(), "Positive");
        assert_eq!(SentimentLabel::Negative.to_string(), "Negative");
        assert_eq!(SentimentLabel::Neutral.to_string(), "Neutral");
    }

    #[test]
    fn test_turn_constructors() {
        let turn = ConversationTurn::user("How is NVDA doing?");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.content, "How is NVDA doing?");

        let turn = ConversationTurn::assistant("Here is what I found.");
        assert_eq!(turn.role, TurnRole::Assistant);
    }
}
