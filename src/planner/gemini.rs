//! Gemini-powered free-form planner
//!
//! Lets the LLM itself decide which capability to invoke next, constrained by
//! the fixed workflow instruction. Responds with a JSON action: either a
//! capability invocation or the final answer.

use crate::gemini::{GeminiClient, SYNTHESIS_TEMPERATURE};
use crate::memory::Transcript;
use crate::models::{CapabilityObservation, CapabilitySpec, NextAction};
use crate::planner::{Planner, ANALYST_SYSTEM_PROMPT};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

pub struct GeminiPlanner {
    client: GeminiClient,
}

impl GeminiPlanner {
    pub fn new(api_key: String) -> Self {
        Self {
            client: GeminiClient::new(api_key),
        }
    }

    /// Build the planning prompt: transcript framing, the question, every
    /// capability result gathered so far, and the JSON action protocol.
    fn build_prompt(
        question: &str,
        transcript: &Transcript,
        observations: &[CapabilityObservation],
        capabilities: &[CapabilitySpec],
    ) -> String {
        let capability_lines = capabilities
            .iter()
            .map(|spec| format!("- {}: {}", spec.name, spec.description))
            .collect::<Vec<_>>()
            .join("\n");

        let gathered = if observations.is_empty() {
            "(nothing yet)".to_string()
        } else {
            observations
                .iter()
                .map(|obs| format!("[{}] input: {} → {}", obs.capability, obs.input, obs.output))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let context = transcript.recent_context(6);
        let framing = if context.is_empty() {
            String::new()
        } else {
            format!("Conversation so far:\n{}\n", context)
        };

        format!(
            r#"{framing}QUESTION:
{question}

Available capabilities:
{capability_lines}

Results gathered so far:
{gathered}

Decide the next step. Respond with ONLY valid JSON, no explanation text:
- To invoke a capability: {{ "action": "invoke", "capability": "<name>", "input": "<free-text input>" }}
- To answer: {{ "action": "final", "answer": "<your complete answer>" }}
"#,
        )
    }
}

#[async_trait]
impl Planner for GeminiPlanner {
    async fn next_action(
        &self,
        question: &str,
        transcript: &Transcript,
        observations: &[CapabilityObservation],
        capabilities: &[CapabilitySpec],
    ) -> Result<NextAction> {
        let prompt = Self::build_prompt(question, transcript, observations, capabilities);

        let response = self
            .client
            .generate(ANALYST_SYSTEM_PROMPT, &prompt, SYNTHESIS_TEMPERATURE)
            .await?;

        parse_action_response(&response)
    }
}

/// Parse the planner's JSON action, tolerating markdown code fences.
fn parse_action_response(response: &str) -> Result<NextAction> {
    let cleaned = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let json: Value = serde_json::from_str(cleaned).map_err(|e| {
        crate::error::AgentError::Planning(format!(
            "Failed to parse planner response: {} | raw={}",
            e, response
        ))
    })?;

    let action = json
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| crate::error::AgentError::Planning("Missing action".to_string()))?;

    match action {
        "invoke" => {
            let capability = json
                .get("capability")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    crate::error::AgentError::Planning("Missing capability".to_string())
                })?
                .to_string();

            let input = json
                .get("input")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            Ok(NextAction::Invoke { capability, input })
        }
        "final" => {
            let answer = json
                .get("answer")
                .and_then(Value::as_str)
                .ok_or_else(|| crate::error::AgentError::Planning("Missing answer".to_string()))?
                .to_string();

            Ok(NextAction::Finish { answer })
        }
        other => Err(crate::error::AgentError::Planning(format!(
            "Unknown action '{}'",
            other
        ))),
    }
}
